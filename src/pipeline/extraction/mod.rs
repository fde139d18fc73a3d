pub mod types;
pub mod sanitize;
pub mod pdf;
pub mod pdfium;
pub mod crop;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use sanitize::*;
pub use pdf::*;
pub use pdfium::*;
pub use crop::*;
pub use ocr::*;
pub use orchestrator::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF could not be opened: {0}")]
    PdfUnreadable(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Crop region {region} lies outside the {width}x{height} page")]
    CropOutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },

    #[error("OCR engine not available at: {0}")]
    OcrEngineUnavailable(PathBuf),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),
}

impl ExtractionError {
    /// Only a container that cannot be opened at all is fatal for a document.
    /// Every other failure degrades to empty text for the affected page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PdfUnreadable(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_container_failures_are_fatal() {
        assert!(ExtractionError::PdfUnreadable("bad xref".into()).is_fatal());
        assert!(ExtractionError::Io(std::io::Error::other("gone")).is_fatal());
        assert!(!ExtractionError::OcrProcessing("engine crashed".into()).is_fatal());
        assert!(!ExtractionError::PdfRendering {
            page: 0,
            reason: "bitmap".into()
        }
        .is_fatal());
        assert!(!ExtractionError::PdfParsing("font".into()).is_fatal());
    }

    #[test]
    fn crop_error_names_page_size() {
        let err = ExtractionError::CropOutOfBounds {
            region: "(5000, 10, 20x20)".into(),
            width: 2480,
            height: 3508,
        };
        assert_eq!(
            err.to_string(),
            "Crop region (5000, 10, 20x20) lies outside the 2480x3508 page"
        );
    }
}
