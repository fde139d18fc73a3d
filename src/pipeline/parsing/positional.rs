//! Positional assignment: the n-th numeral fills the n-th measured field.

use super::metadata::first_date_end;
use super::numbers::extract_numbers;
use super::schema::{MeasurementSchema, MeasurementSet};
use super::strategy::{MeasurementParser, ParseInput, ParsingStrategy};

/// Assign numerals to the schema's measured fields in order.
///
/// Fewer numerals than fields leaves the tail `None`; extras are dropped.
pub fn assign_positionally(schema: &'static MeasurementSchema, numbers: &[f64]) -> MeasurementSet {
    let mut set = MeasurementSet::empty(schema);
    for (name, value) in schema.measured_names().zip(numbers.iter().copied()) {
        set.set(name, Some(value));
    }
    set
}

pub struct PositionalParser {
    schema: &'static MeasurementSchema,
}

impl PositionalParser {
    pub fn new(schema: &'static MeasurementSchema) -> Self {
        Self { schema }
    }
}

impl MeasurementParser for PositionalParser {
    fn strategy(&self) -> ParsingStrategy {
        ParsingStrategy::Positional
    }

    fn parse(&self, input: &ParseInput<'_>) -> MeasurementSet {
        let numbers = extract_numbers(input.ocr_text);
        tracing::debug!(
            numerals = numbers.len(),
            fields = self.schema.measured_names().count(),
            "Positional assignment"
        );
        assign_positionally(self.schema, &numbers)
    }
}

/// Positional, but the scan starts after the first date token.
///
/// Skips header numerals (ID, age, date) when the crop includes them.
/// Without a date the whole OCR text is scanned.
pub struct DateAnchoredParser {
    schema: &'static MeasurementSchema,
}

impl DateAnchoredParser {
    pub fn new(schema: &'static MeasurementSchema) -> Self {
        Self { schema }
    }
}

impl MeasurementParser for DateAnchoredParser {
    fn strategy(&self) -> ParsingStrategy {
        ParsingStrategy::DateAnchored
    }

    fn parse(&self, input: &ParseInput<'_>) -> MeasurementSet {
        let text = input.ocr_text;
        let body = match first_date_end(text) {
            Some(end) => &text[end..],
            None => {
                tracing::debug!("No date anchor in OCR text, scanning from start");
                text
            }
        };
        assign_positionally(self.schema, &extract_numbers(body))
    }
}
