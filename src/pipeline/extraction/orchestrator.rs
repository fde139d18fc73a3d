use super::crop::{crop_page_image, CropRegion};
use super::pdf::open_container;
use super::pdfium::DEFAULT_RENDER_DPI;
use super::sanitize::sanitize_extracted_text;
use super::types::{DocumentText, OcrEngine, PdfExtractor, PdfPageRenderer};
use super::ExtractionError;

/// Produces both text sources for one report.
/// Uses trait objects for OCR, text layer and rasterizer, enabling dependency injection.
pub struct DocumentExtractor {
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    pdf_renderer: Option<Box<dyn PdfPageRenderer + Send + Sync>>,
    crop: CropRegion,
    dpi: u32,
}

impl DocumentExtractor {
    pub fn new(
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    ) -> Self {
        Self {
            ocr_engine,
            pdf_extractor,
            pdf_renderer: None,
            crop: CropRegion::default(),
            dpi: DEFAULT_RENDER_DPI,
        }
    }

    /// Add a page rasterizer. Without one, OCR text is always empty.
    pub fn with_pdf_renderer(mut self, renderer: Box<dyn PdfPageRenderer + Send + Sync>) -> Self {
        self.pdf_renderer = Some(renderer);
        self
    }

    pub fn with_crop(mut self, crop: CropRegion) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Extract the text layer and the cropped OCR text of every page.
    ///
    /// Only an unopenable container is returned as an error. Text-layer,
    /// render, crop and OCR failures are logged and yield empty page text.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<DocumentText, ExtractionError> {
        let page_count = open_container(pdf_bytes)?;

        let text_pages = match self.pdf_extractor.extract_text(pdf_bytes) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(error = %e, "Text layer unavailable, continuing with empty pages");
                vec![String::new(); page_count]
            }
        };

        let ocr_pages: Vec<String> = match self.pdf_renderer.as_deref() {
            Some(renderer) => (0..page_count)
                .map(|page| self.ocr_page(renderer, pdf_bytes, page))
                .collect(),
            None => {
                tracing::warn!("No PDF renderer configured, skipping OCR");
                vec![String::new(); page_count]
            }
        };

        let text_layer = join_pages(&text_pages);
        let ocr_text = join_pages(&ocr_pages);

        tracing::info!(
            pages = page_count,
            text_layer_len = text_layer.len(),
            ocr_len = ocr_text.len(),
            "Text extraction complete"
        );

        Ok(DocumentText {
            text_layer,
            ocr_text,
            page_count,
        })
    }

    /// Render, crop and OCR one page. Any failure degrades to an empty string.
    fn ocr_page(&self, renderer: &dyn PdfPageRenderer, pdf_bytes: &[u8], page: usize) -> String {
        let result = renderer
            .render_page(pdf_bytes, page, self.dpi)
            .and_then(|png| crop_page_image(&png, &self.crop))
            .and_then(|cropped| self.ocr_engine.ocr_image(&cropped));

        match result {
            Ok(ocr) => ocr.text,
            Err(e) => {
                tracing::warn!(
                    page = page + 1,
                    error = %e,
                    "OCR failed for page, using empty text"
                );
                String::new()
            }
        }
    }
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| sanitize_extracted_text(p))
        .collect::<Vec<_>>()
        .join("\n")
}
