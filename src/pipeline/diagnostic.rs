//! Debug artifacts: raw OCR text written next to the source report.
//!
//! **Activation**: `ocr_debug` in the config file or `SECA_OCR_DEBUG=1`.
//!
//! **Output**: for `reports/IAS102_seca.pdf`, the file
//! `reports/IAS102_seca_ocr.txt`. Writing never affects parsing results.

use std::path::{Path, PathBuf};

use crate::collaborators::DebugArtifactWriter;

/// Appended to the report's file stem.
pub const OCR_DUMP_SUFFIX: &str = "_ocr.txt";

/// `<dir>/<stem>_ocr.txt` for a source report.
pub fn ocr_dump_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    source.with_file_name(format!("{stem}{OCR_DUMP_SUFFIX}"))
}

/// Write a text artifact.
///
/// Logs on success (debug) and failure (warn). Never panics.
pub fn dump_text(path: &Path, text: &str) -> bool {
    match std::fs::write(path, text.as_bytes()) {
        Ok(()) => {
            tracing::debug!(
                path = %path.display(),
                size = text.len(),
                "Debug artifact: OCR text written"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Debug artifact: failed to write OCR text"
            );
            false
        }
    }
}

/// Writes OCR text next to each source report.
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrTextDump;

impl DebugArtifactWriter for OcrTextDump {
    fn write_ocr_text(&self, source: &Path, ocr_text: &str) {
        dump_text(&ocr_dump_path(source), ocr_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_path_sits_next_to_source() {
        let path = ocr_dump_path(Path::new("/data/reports/IAS102_seca.pdf"));
        assert_eq!(path, PathBuf::from("/data/reports/IAS102_seca_ocr.txt"));
    }

    #[test]
    fn dump_path_without_extension() {
        let path = ocr_dump_path(Path::new("scan"));
        assert_eq!(path, PathBuf::from("scan_ocr.txt"));
    }

    #[test]
    fn writer_creates_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("report.pdf");

        OcrTextDump.write_ocr_text(&source, "18.2 25.4");

        let content = std::fs::read_to_string(tmp.path().join("report_ocr.txt")).unwrap();
        assert_eq!(content, "18.2 25.4");
    }

    #[test]
    fn dump_text_handles_write_failure_gracefully() {
        let bad = Path::new("/nonexistent/path/that/does/not/exist/x_ocr.txt");
        assert!(!dump_text(bad, "data"));
    }
}
