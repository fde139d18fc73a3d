//! Label-anchored parsing (legacy mode).
//!
//! Each group names a printed label and the fields that follow it. The first
//! case-insensitive occurrence of the label opens a window of characters; the
//! first numerals inside it fill the group's fields in order.

use super::numbers::extract_numbers_limited;
use super::schema::fields::*;
use super::schema::{MeasurementSchema, MeasurementSet};
use super::strategy::{MeasurementParser, ParseInput, ParsingStrategy};

/// Characters scanned from the start of a label.
pub const DEFAULT_LABEL_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct LabelGroup {
    pub label: &'static str,
    pub fields: &'static [&'static str],
}

const fn group(label: &'static str, fields: &'static [&'static str]) -> LabelGroup {
    LabelGroup { label, fields }
}

pub const LABEL_GROUPS: &[LabelGroup] = &[
    group("Fat Mass", &[FAT_MASS_KG, FAT_MASS_PCT]),
    group("Fat Mass Index", &[FAT_MASS_INDEX]),
    group("Fat-Free Mass", &[FAT_FREE_MASS_KG, FAT_FREE_MASS_PCT]),
    group("Fat-Free Mass Index", &[FAT_FREE_MASS_INDEX]),
    group("Skeletal Muscle Mass", &[SKELETAL_MUSCLE_MASS]),
    group("right arm", &[RIGHT_ARM_SMM]),
    group("left arm", &[LEFT_ARM_SMM]),
    group("right leg", &[RIGHT_LEG_SMM]),
    group("left leg", &[LEFT_LEG_SMM]),
    group("torso", &[TORSO_SMM]),
    group("Visceral Adipose Tissue", &[VISCERAL_ADIPOSE_TISSUE]),
    group("Body Mass Index", &[BODY_MASS_INDEX]),
    group("Height", &[HEIGHT]),
    group("Weight", &[WEIGHT]),
    group("Total Body Water", &[TOTAL_BODY_WATER_L, TOTAL_BODY_WATER_PCT]),
    group(
        "Extracellular Water",
        &[EXTRACELLULAR_WATER_L, EXTRACELLULAR_WATER_PCT],
    ),
    group("ECW/TBW", &[ECW_TBW_PCT]),
    group("Resting Energy Expenditure", &[RESTING_ENERGY_EXPENDITURE]),
    group("Energy Consumption", &[ENERGY_CONSUMPTION]),
    group("Phase Angle", &[PHASE_ANGLE]),
    group("Percentile", &[PHASE_ANGLE_PERCENTILE]),
    group("Resistance", &[RESISTANCE]),
    group("Reactance", &[REACTANCE]),
    group("Physical Activity Level", &[PHYSICAL_ACTIVITY_LEVEL]),
];

pub struct LabelAnchoredParser {
    schema: &'static MeasurementSchema,
    groups: &'static [LabelGroup],
    window: usize,
}

impl LabelAnchoredParser {
    pub fn new(schema: &'static MeasurementSchema) -> Self {
        Self {
            schema,
            groups: LABEL_GROUPS,
            window: DEFAULT_LABEL_WINDOW,
        }
    }

    pub fn with_window(mut self, chars: usize) -> Self {
        self.window = chars;
        self
    }

    pub fn with_groups(mut self, groups: &'static [LabelGroup]) -> Self {
        self.groups = groups;
        self
    }
}

impl MeasurementParser for LabelAnchoredParser {
    fn strategy(&self) -> ParsingStrategy {
        ParsingStrategy::LabelAnchored
    }

    fn parse(&self, input: &ParseInput<'_>) -> MeasurementSet {
        let text = input.full_text;
        let mut set = MeasurementSet::empty(self.schema);

        for group in self.groups {
            let Some(start) = find_ignore_ascii_case(text, group.label) else {
                tracing::debug!(label = group.label, "Label not found");
                continue;
            };
            let window = char_window(&text[start..], self.window);
            let values = extract_numbers_limited(window, group.fields.len());
            for (field, value) in group.fields.iter().zip(values) {
                set.set(field, Some(value));
            }
        }

        set
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
///
/// `needle` is ASCII, so a match always starts on a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

/// At most `chars` characters from the start of `text`.
fn char_window(text: &str, chars: usize) -> &str {
    let end = text
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}
