//! External collaborators the converter calls into.
//!
//! Dialogs, spreadsheet output and debug artifacts sit behind traits so the
//! session flow can be driven by mocks in tests. Production implementations
//! use native dialogs (`rfd`) and an Excel workbook (`rust_xlsxwriter`); CSV
//! output (`csv`) is available as an alternative writer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════

/// Supplies the reports to convert, in order. Empty means nothing selected.
pub trait FileSelector {
    fn select_files(&self) -> Vec<PathBuf>;
}

/// Supplies the directory the spreadsheet is written to.
pub trait OutputLocator {
    fn select_output_dir(&self) -> Option<PathBuf>;
}

/// Shows a (title, message) notice to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Text cell, or `Empty` for an empty string.
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(v) => write!(f, "{v}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Writes a header row and data rows to a file.
pub trait SpreadsheetWriter {
    /// File extension of the produced file, without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, path: &Path, headers: &[String], rows: &[Vec<Cell>])
        -> Result<(), SpreadsheetError>;
}

/// Persists raw OCR text for manual inspection.
pub trait DebugArtifactWriter {
    fn write_ocr_text(&self, source: &Path, ocr_text: &str);
}

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ═══════════════════════════════════════════════════════════
// Native dialogs
// ═══════════════════════════════════════════════════════════

pub struct DialogFileSelector;

impl FileSelector for DialogFileSelector {
    fn select_files(&self) -> Vec<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select SECA PDF files")
            .add_filter("PDF files", &["pdf"])
            .pick_files()
            .unwrap_or_default()
    }
}

pub struct DialogOutputLocator;

impl OutputLocator for DialogOutputLocator {
    fn select_output_dir(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select download folder")
            .pick_folder()
    }
}

pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::info!(title, message, "User notice");
        rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_level(rfd::MessageLevel::Info)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

// ═══════════════════════════════════════════════════════════
// Spreadsheet output
// ═══════════════════════════════════════════════════════════

/// Single-sheet `.xlsx` workbook: header row, then one row per report.
/// Numbers are stored as numeric cells; empty cells are left blank.
pub struct XlsxSpreadsheetWriter;

impl SpreadsheetWriter for XlsxSpreadsheetWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(
        &self,
        path: &Path,
        headers: &[String],
        rows: &[Vec<Cell>],
    ) -> Result<(), SpreadsheetError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, header)?;
        }
        for (index, row) in rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(row_num, col as u16, s)?;
                    }
                    Cell::Number(v) => {
                        sheet.write_number(row_num, col as u16, *v)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        workbook.save(path)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "Workbook written");
        Ok(())
    }
}

pub struct CsvSpreadsheetWriter;

/// Spreadsheet format selected in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn writer(self) -> Box<dyn SpreadsheetWriter> {
        match self {
            Self::Xlsx => Box::new(XlsxSpreadsheetWriter),
            Self::Csv => Box::new(CsvSpreadsheetWriter),
        }
    }
}

impl SpreadsheetWriter for CsvSpreadsheetWriter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(
        &self,
        path: &Path,
        headers: &[String],
        rows: &[Vec<Cell>],
    ) -> Result<(), SpreadsheetError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row.iter().map(Cell::to_string))?;
        }
        writer.flush()?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "Spreadsheet written");
        Ok(())
    }
}

// ── Mocks for testing ──

/// Returns a fixed selection.
pub struct MockFileSelector(pub Vec<PathBuf>);

impl FileSelector for MockFileSelector {
    fn select_files(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

pub struct MockOutputLocator(pub Option<PathBuf>);

impl OutputLocator for MockOutputLocator {
    fn select_output_dir(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(String, String)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((title.to_string(), message.to_string()));
        }
    }
}

/// Records OCR text per source instead of writing files.
#[derive(Default)]
pub struct RecordingArtifactWriter {
    written: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingArtifactWriter {
    pub fn written(&self) -> Vec<(PathBuf, String)> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl DebugArtifactWriter for RecordingArtifactWriter {
    fn write_ocr_text(&self, source: &Path, ocr_text: &str) {
        if let Ok(mut written) = self.written.lock() {
            written.push((source.to_path_buf(), ocr_text.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn headers() -> Vec<String> {
        vec![
            "Source File".to_string(),
            "Patient ID".to_string(),
            "Weight (kg)".to_string(),
        ]
    }

    #[test]
    fn xlsx_writer_stores_numbers_as_numbers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");
        let rows = vec![vec![Cell::text("a.pdf"), Cell::Empty, Cell::Number(70.5)]];

        XlsxSpreadsheetWriter.write(&path, &headers(), &rows).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        let sheet = book.worksheet_range("Sheet1").unwrap();
        assert_eq!(
            sheet.get_value((0, 0)),
            Some(&Data::String("Source File".into()))
        );
        assert_eq!(
            sheet.get_value((0, 2)),
            Some(&Data::String("Weight (kg)".into()))
        );
        assert_eq!(sheet.get_value((1, 0)), Some(&Data::String("a.pdf".into())));
        assert_eq!(sheet.get_value((1, 1)), Some(&Data::Empty));
        assert_eq!(sheet.get_value((1, 2)), Some(&Data::Float(70.5)));
    }

    #[test]
    fn xlsx_writer_reports_unwritable_path() {
        let err = XlsxSpreadsheetWriter
            .write(Path::new("/nonexistent/dir/out.xlsx"), &headers(), &[])
            .unwrap_err();
        assert!(matches!(err, SpreadsheetError::Xlsx(_)));
    }

    #[test]
    fn output_format_selects_writer() {
        assert_eq!(OutputFormat::default().writer().extension(), "xlsx");
        assert_eq!(OutputFormat::Csv.writer().extension(), "csv");
        let parsed: OutputFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(parsed, OutputFormat::Csv);
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(Cell::Number(25.0).to_string(), "25");
        assert_eq!(Cell::Number(-0.4).to_string(), "-0.4");
        assert_eq!(Cell::text("Pass").to_string(), "Pass");
        assert_eq!(Cell::text(""), Cell::Empty);
    }

    #[test]
    fn csv_writer_writes_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let headers = vec!["Source File".to_string(), "Weight (kg)".to_string()];
        let rows = vec![
            vec![Cell::text("a.pdf"), Cell::Number(70.5)],
            vec![Cell::text("b, c.pdf"), Cell::Empty],
        ];

        CsvSpreadsheetWriter.write(&path, &headers, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines,
            vec!["Source File,Weight (kg)", "a.pdf,70.5", "\"b, c.pdf\","]
        );
    }

    #[test]
    fn csv_writer_reports_unwritable_path() {
        let err = CsvSpreadsheetWriter
            .write(Path::new("/nonexistent/dir/out.csv"), &[], &[])
            .unwrap_err();
        assert!(matches!(err, SpreadsheetError::Csv(_)));
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::default();
        notifier.notify("A", "first");
        notifier.notify("B", "second");
        assert_eq!(
            notifier.notices(),
            vec![
                ("A".to_string(), "first".to_string()),
                ("B".to_string(), "second".to_string())
            ]
        );
    }

    #[test]
    fn collaborator_traits_are_object_safe() {
        fn _fs(_: &dyn FileSelector) {}
        fn _ol(_: &dyn OutputLocator) {}
        fn _n(_: &dyn Notifier) {}
        fn _sw(_: &dyn SpreadsheetWriter) {}
        fn _dw(_: &dyn DebugArtifactWriter) {}
    }
}
