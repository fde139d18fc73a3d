use super::types::PdfExtractor;
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Reads the embedded text layer of every page.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}

/// Open the PDF container and return its page count.
///
/// This is the one check whose failure aborts a batch: if lopdf cannot load
/// the file, neither the text layer nor the rasterizer will do better.
pub fn open_container(pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
    let doc = lopdf::Document::load_mem(pdf_bytes)
        .map_err(|e| ExtractionError::PdfUnreadable(e.to_string()))?;
    let pages = doc.get_pages().len();
    if pages == 0 {
        return Err(ExtractionError::PdfUnreadable(
            "document has no pages".into(),
        ));
    }
    Ok(pages)
}
