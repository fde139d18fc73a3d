//! Parsing layer: report text to typed metadata and measurements.
//!
//! The measurement schema is data (`schema`), parsing strategies sit behind
//! the `MeasurementParser` trait (`strategy`), and derived fields are a
//! separate post-processing step (`derived`).

pub mod derived;
pub mod label;
pub mod metadata;
pub mod numbers;
pub mod positional;
pub mod schema;
pub mod strategy;

pub use derived::{apply_derived_fields, body_mass_index, DerivedField, DERIVED_FIELDS};
pub use label::{LabelAnchoredParser, LabelGroup, DEFAULT_LABEL_WINDOW, LABEL_GROUPS};
pub use metadata::{parse_metadata, MetadataRecord};
pub use numbers::{extract_numbers, normalize_number};
pub use positional::{assign_positionally, DateAnchoredParser, PositionalParser};
pub use schema::{
    canonical_schema, fields, FieldKind, FieldSpec, MeasurementSchema, MeasurementSet,
    POSITIONAL_LAYOUT, SCHEMA_VERSION,
};
pub use strategy::{parser_for, MeasurementParser, ParseInput, ParserSettings, ParsingStrategy};
