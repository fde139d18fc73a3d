//! Measurement parsing strategies behind one capability.
//!
//! `ParsingStrategy` is the configuration value; `parser_for` resolves it to a
//! `MeasurementParser`. Positional is the canonical mode; date-anchored and
//! label-anchored are kept as fallbacks for reports that trip it up.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::label::{LabelAnchoredParser, DEFAULT_LABEL_WINDOW};
use super::positional::{DateAnchoredParser, PositionalParser};
use super::schema::{MeasurementSchema, MeasurementSet};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Which parser turns report text into measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsingStrategy {
    /// Numerals of the cropped OCR region assigned in schema order.
    #[default]
    Positional,
    /// Positional, starting after the first date token.
    DateAnchored,
    /// Numerals found within a window after each printed label.
    LabelAnchored,
}

impl fmt::Display for ParsingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => write!(f, "positional"),
            Self::DateAnchored => write!(f, "date_anchored"),
            Self::LabelAnchored => write!(f, "label_anchored"),
        }
    }
}

/// Both text sources of one report, as seen by a parser.
#[derive(Debug, Clone, Copy)]
pub struct ParseInput<'a> {
    /// OCR text of the cropped measurement region.
    pub ocr_text: &'a str,
    /// Text layer and OCR text together.
    pub full_text: &'a str,
}

/// Turns report text into a measurement set over `schema`.
///
/// Never fails: anything not found is left `None`.
pub trait MeasurementParser {
    fn strategy(&self) -> ParsingStrategy;

    fn parse(&self, input: &ParseInput<'_>) -> MeasurementSet;
}

// ═══════════════════════════════════════════════════════════
// Strategy resolution
// ═══════════════════════════════════════════════════════════

/// Tunables shared by the strategies.
#[derive(Debug, Clone, Copy)]
pub struct ParserSettings {
    pub schema: &'static MeasurementSchema,
    /// Characters scanned after a label (label-anchored only).
    pub label_window: usize,
}

impl ParserSettings {
    pub fn new(schema: &'static MeasurementSchema) -> Self {
        Self {
            schema,
            label_window: DEFAULT_LABEL_WINDOW,
        }
    }

    pub fn with_label_window(mut self, chars: usize) -> Self {
        self.label_window = chars;
        self
    }
}

/// Build the parser for a configured strategy.
pub fn parser_for(
    strategy: ParsingStrategy,
    settings: ParserSettings,
) -> Box<dyn MeasurementParser + Send + Sync> {
    match strategy {
        ParsingStrategy::Positional => Box::new(PositionalParser::new(settings.schema)),
        ParsingStrategy::DateAnchored => Box::new(DateAnchoredParser::new(settings.schema)),
        ParsingStrategy::LabelAnchored => Box::new(
            LabelAnchoredParser::new(settings.schema).with_window(settings.label_window),
        ),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parsing::schema::{canonical_schema, fields};

    const ALL: [ParsingStrategy; 3] = [
        ParsingStrategy::Positional,
        ParsingStrategy::DateAnchored,
        ParsingStrategy::LabelAnchored,
    ];

    #[test]
    fn default_is_positional() {
        assert_eq!(ParsingStrategy::default(), ParsingStrategy::Positional);
    }

    #[test]
    fn resolved_parser_reports_its_strategy() {
        for strategy in ALL {
            let parser = parser_for(strategy, ParserSettings::new(canonical_schema()));
            assert_eq!(parser.strategy(), strategy);
        }
    }

    #[test]
    fn every_strategy_yields_complete_set_on_empty_input() {
        let input = ParseInput {
            ocr_text: "",
            full_text: "",
        };
        for strategy in ALL {
            let parser = parser_for(strategy, ParserSettings::new(canonical_schema()));
            let set = parser.parse(&input);
            assert_eq!(set.len(), canonical_schema().len(), "{strategy}");
            assert_eq!(set.populated(), 0, "{strategy}");
        }
    }

    #[test]
    fn label_window_setting_reaches_parser() {
        let text = "Weight                    70.5";
        let input = ParseInput {
            ocr_text: "",
            full_text: text,
        };
        let narrow = parser_for(
            ParsingStrategy::LabelAnchored,
            ParserSettings::new(canonical_schema()).with_label_window(10),
        );
        assert_eq!(narrow.parse(&input).get(fields::WEIGHT), None);

        let wide = parser_for(
            ParsingStrategy::LabelAnchored,
            ParserSettings::new(canonical_schema()),
        );
        assert_eq!(wide.parse(&input).get(fields::WEIGHT), Some(70.5));
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&ParsingStrategy::DateAnchored).unwrap();
        assert_eq!(json, "\"date_anchored\"");
        let back: ParsingStrategy = serde_json::from_str("\"label_anchored\"").unwrap();
        assert_eq!(back, ParsingStrategy::LabelAnchored);
    }

    #[test]
    fn strategy_display() {
        assert_eq!(format!("{}", ParsingStrategy::Positional), "positional");
        assert_eq!(format!("{}", ParsingStrategy::LabelAnchored), "label_anchored");
    }

    #[test]
    fn parser_trait_is_object_safe() {
        fn _assert(_: &dyn MeasurementParser) {}
    }
}
