//! Row assembly: one flat spreadsheet row per report.
//!
//! Column order is fixed: source file, metadata, quality status, quality
//! failures, then every measurement in schema order.

use serde::Serialize;

use super::extraction::collapse_whitespace;
use super::extraction::DocumentText;
use super::parsing::{MeasurementSchema, MeasurementSet, MetadataRecord};
use super::quality::{evaluate, QualityVerdict};
use crate::collaborators::Cell;

/// Columns before the measurements.
pub const LEADING_COLUMNS: [&str; 8] = [
    "Source File",
    "Patient ID",
    "Sex",
    "Age",
    "Collection Date",
    "Collection Time",
    "Quality Status",
    "Quality Failures",
];

/// Keywords every recognized report header contains.
pub const DEFAULT_RECOGNITION_KEYWORDS: &[&str] = &["seca"];

/// One report, flattened. The verdict is computed from the measurements at
/// construction and cannot drift from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    source_file: String,
    metadata: MetadataRecord,
    verdict: QualityVerdict,
    measurements: MeasurementSet,
}

impl OutputRow {
    /// Evaluate `measurements` and build the row. An unrecognized report
    /// carries the `UNRECOGNIZED_REPORT` sentinel ahead of any rule failures.
    pub fn new(
        source_file: String,
        metadata: MetadataRecord,
        measurements: MeasurementSet,
        recognized: bool,
    ) -> Self {
        let verdict = evaluate(&measurements);
        let verdict = if recognized {
            verdict
        } else {
            verdict.with_unrecognized_report()
        };
        Self {
            source_file,
            metadata,
            verdict,
            measurements,
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    pub fn verdict(&self) -> &QualityVerdict {
        &self.verdict
    }

    pub fn measurements(&self) -> &MeasurementSet {
        &self.measurements
    }

    /// Cells in column order. Measurements are numeric; `None` is empty.
    pub fn to_record(&self) -> Vec<Cell> {
        let mut record = Vec::with_capacity(LEADING_COLUMNS.len() + self.measurements.len());
        record.push(Cell::text(&self.source_file));
        record.extend(
            self.metadata
                .columns()
                .iter()
                .map(|v| v.map(Cell::text).unwrap_or(Cell::Empty)),
        );
        record.push(Cell::text(&self.verdict.status().to_string()));
        record.push(Cell::text(&self.verdict.failures_joined()));
        record.extend(
            self.measurements
                .iter()
                .map(|(_, value)| value.map(Cell::Number).unwrap_or(Cell::Empty)),
        );
        record
    }
}

/// Header row for a schema.
pub fn column_headers(schema: &MeasurementSchema) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .copied()
        .chain(schema.names())
        .map(str::to_string)
        .collect()
}

/// Whitespace-collapsed text layer and OCR text, used for metadata and
/// recognition.
pub fn header_text(text: &DocumentText) -> String {
    collapse_whitespace(&format!("{} {}", text.text_layer, text.ocr_text))
}

/// True when the header contains every keyword, ignoring case.
pub fn is_recognized<S: AsRef<str>>(header: &str, keywords: &[S]) -> bool {
    let header = header.to_lowercase();
    keywords
        .iter()
        .all(|k| header.contains(&k.as_ref().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parsing::{canonical_schema, fields, parse_metadata};
    use crate::pipeline::quality::{FailureCode, QualityStatus};

    fn measurements() -> MeasurementSet {
        let mut measurements = MeasurementSet::empty(canonical_schema());
        measurements.set(fields::FAT_MASS_KG, Some(18.2));
        measurements.set(fields::WEIGHT, Some(70.0));
        measurements
    }

    fn row() -> OutputRow {
        OutputRow::new(
            "IAS102_seca.pdf".into(),
            parse_metadata("Patient ID: 102 Age: 41 Male 03.11.2023 10:42"),
            measurements(),
            true,
        )
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn headers_lead_with_fixed_columns() {
        let headers = column_headers(canonical_schema());
        assert_eq!(headers.len(), 8 + 28);
        assert_eq!(headers[0], "Source File");
        assert_eq!(headers[7], "Quality Failures");
        assert_eq!(headers[8], fields::FAT_MASS_KG);
        assert_eq!(headers.last().map(String::as_str), Some(fields::REACTANCE));
    }

    #[test]
    fn record_matches_header_length() {
        let row = row();
        assert_eq!(row.to_record().len(), column_headers(canonical_schema()).len());
    }

    #[test]
    fn record_cells_in_column_order() {
        let record = row().to_record();
        assert_eq!(
            &record[..7],
            &[
                text("IAS102_seca.pdf"),
                text("102"),
                text("Male"),
                text("41"),
                text("03.11.2023"),
                text("10:42"),
                text("Fail"),
            ]
        );
        assert!(record[7].to_string().starts_with("R1,R2"));
        assert_eq!(record[8], Cell::Number(18.2));
        assert_eq!(record[9], Cell::Empty);
    }

    #[test]
    fn measurements_are_numeric_cells() {
        let record = row().to_record();
        let weight = column_headers(canonical_schema())
            .iter()
            .position(|h| h == fields::WEIGHT)
            .unwrap();
        assert_eq!(record[weight], Cell::Number(70.0));
        assert_eq!(record[weight].to_string(), "70");
    }

    #[test]
    fn missing_metadata_renders_empty() {
        let row = OutputRow::new(
            "x.pdf".into(),
            MetadataRecord::default(),
            measurements(),
            true,
        );
        let record = row.to_record();
        assert!(record[1..6].iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn verdict_follows_measurements() {
        let row = row();
        assert_eq!(row.verdict(), &evaluate(row.measurements()));
        assert_eq!(row.source_file(), "IAS102_seca.pdf");
        assert_eq!(row.metadata().patient_id.as_deref(), Some("102"));
    }

    #[test]
    fn unrecognized_row_leads_with_sentinel() {
        let row = OutputRow::new(
            "other.pdf".into(),
            MetadataRecord::default(),
            measurements(),
            false,
        );
        assert_eq!(row.verdict().status(), QualityStatus::Fail);
        assert_eq!(row.verdict().failures()[0], FailureCode::UnrecognizedReport);
        assert!(row.verdict().failures().len() > 1);
    }

    #[test]
    fn header_text_collapses_both_sources() {
        let text = DocumentText {
            text_layer: "seca\n mBCA".into(),
            ocr_text: "  18.2\n\n25.4 ".into(),
            page_count: 1,
        };
        assert_eq!(header_text(&text), "seca mBCA 18.2 25.4");
    }

    #[test]
    fn recognition_ignores_case() {
        assert!(is_recognized("SECA mBCA 515", DEFAULT_RECOGNITION_KEYWORDS));
        assert!(!is_recognized("InBody 770", DEFAULT_RECOGNITION_KEYWORDS));
        assert!(is_recognized("anything", &[] as &[&str]));
        assert!(!is_recognized("seca", &["seca", "mBCA"]));
    }
}
