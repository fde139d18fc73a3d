use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Text recovered from one report, from both sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    /// Embedded text of every page, newline-joined (empty page = empty line).
    pub text_layer: String,
    /// OCR text of the cropped measurement region of every page, newline-joined.
    pub ocr_text: String,
    pub page_count: usize,
}

impl DocumentText {
    /// Both sources in one blob, text layer first.
    pub fn combined(&self) -> String {
        match (self.text_layer.trim().is_empty(), self.ocr_text.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.text_layer.clone(),
            (true, false) => self.ocr_text.clone(),
            (false, false) => format!("{}\n{}", self.text_layer, self.ocr_text),
        }
    }
}

/// Raw OCR result from the engine
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPageResult {
    pub text: String,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError>;
}

/// PDF text-layer abstraction. One entry per page, in page order.
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Rasterizes a single PDF page to PNG bytes. Page count comes from
/// `open_container`.
pub trait PdfPageRenderer {
    /// Render one page (0-based) at the given DPI, PNG-encoded.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError>;
}
