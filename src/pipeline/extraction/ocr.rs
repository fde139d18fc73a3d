use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::{OcrEngine, OcrPageResult};
use super::ExtractionError;

/// Tesseract page segmentation mode 6: a single uniform block of text.
/// Keeps the measurement table in reading order.
pub const DEFAULT_PAGE_SEG_MODE: u8 = 6;

/// Tesseract invoked as an external binary.
///
/// The binary location is configuration: a bare name is resolved on `PATH`,
/// anything else is used as given.
pub struct TesseractCli {
    binary: PathBuf,
    lang: String,
    page_seg_mode: u8,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            lang: "eng".to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+deu")
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }

    pub fn with_page_seg_mode(mut self, psm: u8) -> Self {
        self.page_seg_mode = psm;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run `tesseract --version` to confirm the binary can be launched.
    pub fn verify(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| self.launch_error(e))?;
        let banner = String::from_utf8_lossy(&output.stdout);
        Ok(banner.lines().next().unwrap_or_default().trim().to_string())
    }

    fn launch_error(&self, e: std::io::Error) -> ExtractionError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractionError::OcrEngineUnavailable(self.binary.clone())
        } else {
            ExtractionError::OcrProcessing(format!(
                "Failed to launch {}: {e}",
                self.binary.display()
            ))
        }
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        // Tesseract reads from a file path; the temp file is removed on drop.
        let mut input = tempfile::Builder::new()
            .prefix("seca-ocr-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(image_bytes)?;
        input.flush()?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .args(["-l", self.lang.as_str()])
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .output()
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(
            chars = text.len(),
            lang = %self.lang,
            psm = self.page_seg_mode,
            "Tesseract finished"
        );

        Ok(OcrPageResult { text })
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    result: Result<String, String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    /// An engine that fails every call with the given reason.
    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        match &self.result {
            Ok(text) => Ok(OcrPageResult { text: text.clone() }),
            Err(reason) => Err(ExtractionError::OcrProcessing(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ocr_returns_configured_text() {
        let engine = MockOcrEngine::new("12.5 30.1 18.2");
        let result = engine.ocr_image(b"fake_image_bytes").unwrap();
        assert_eq!(result.text, "12.5 30.1 18.2");
    }

    #[test]
    fn failing_mock_reports_processing_error() {
        let engine = MockOcrEngine::failing("corrupt image");
        let err = engine.ocr_image(b"fake").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrProcessing(ref r) if r == "corrupt image"));
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let engine = TesseractCli::new("/nonexistent/bin/tesseract-seca-test");
        let err = engine.ocr_image(b"png").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrEngineUnavailable(_)));
        assert!(matches!(
            engine.verify(),
            Err(ExtractionError::OcrEngineUnavailable(_))
        ));
    }

    #[test]
    fn builder_overrides_defaults() {
        let engine = TesseractCli::new("tesseract")
            .with_languages("eng+deu")
            .with_page_seg_mode(4);
        assert_eq!(engine.lang, "eng+deu");
        assert_eq!(engine.page_seg_mode, 4);
        assert_eq!(engine.binary(), Path::new("tesseract"));
    }
}
