//! Document processing: one report file to one output row.
//!
//! text sources → metadata + measurements → derived fields → quality rules →
//! recognition check → row.
//!
//! Uses trait-based DI for every engine (OCR, text layer, rasterizer, parser)
//! so the processor stays fully testable with mock implementations.

use std::path::{Path, PathBuf};

use crate::collaborators::DebugArtifactWriter;
use crate::config::AppConfig;
use crate::pipeline::assembly::{
    header_text, is_recognized, OutputRow, DEFAULT_RECOGNITION_KEYWORDS,
};
use crate::pipeline::diagnostic::OcrTextDump;
use crate::pipeline::extraction::{
    DocumentExtractor, DocumentText, ExtractionError, PdfTextExtractor, PdfiumRenderer,
    TesseractCli,
};
use crate::pipeline::parsing::{
    apply_derived_fields, canonical_schema, parse_metadata, parser_for, MeasurementParser,
    ParseInput, ParserSettings,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures that stop a document (and therefore the batch).
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct DocumentProcessor {
    extractor: DocumentExtractor,
    parser: Box<dyn MeasurementParser + Send + Sync>,
    recognition_keywords: Vec<String>,
    debug_writer: Option<Box<dyn DebugArtifactWriter + Send + Sync>>,
}

impl DocumentProcessor {
    pub fn new(
        extractor: DocumentExtractor,
        parser: Box<dyn MeasurementParser + Send + Sync>,
    ) -> Self {
        Self {
            extractor,
            parser,
            recognition_keywords: DEFAULT_RECOGNITION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            debug_writer: None,
        }
    }

    pub fn with_recognition_keywords(mut self, keywords: Vec<String>) -> Self {
        self.recognition_keywords = keywords;
        self
    }

    /// Persist each report's OCR text through `writer`.
    pub fn with_debug_writer(mut self, writer: Box<dyn DebugArtifactWriter + Send + Sync>) -> Self {
        self.debug_writer = Some(writer);
        self
    }

    /// Read, extract and assemble one report.
    ///
    /// Only an unreadable file or PDF container is an error; everything else
    /// ends up as `None` fields or a failing verdict in the row.
    pub fn process_file(&self, path: &Path) -> Result<OutputRow, ProcessingError> {
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!(file = %source_file, "Processing report");

        let bytes = std::fs::read(path).map_err(|source| ProcessingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = degrade_non_fatal(&source_file, self.extractor.extract(&bytes))?;

        if let Some(writer) = &self.debug_writer {
            writer.write_ocr_text(path, &text.ocr_text);
        }

        let row = self.assemble(source_file, &text);
        tracing::info!(
            file = %row.source_file(),
            status = %row.verdict().status(),
            failures = %row.verdict().failures_joined(),
            populated = row.measurements().populated(),
            "Report processed"
        );
        Ok(row)
    }

    /// Parse and validate already extracted text. Pure.
    pub fn assemble(&self, source_file: String, text: &DocumentText) -> OutputRow {
        let header = header_text(text);
        let metadata = parse_metadata(&header);

        let full_text = text.combined();
        let mut measurements = self.parser.parse(&ParseInput {
            ocr_text: &text.ocr_text,
            full_text: &full_text,
        });
        apply_derived_fields(&mut measurements);

        let recognized = is_recognized(&header, &self.recognition_keywords);
        if !recognized {
            tracing::warn!(file = %source_file, "Report header not recognized");
        }

        OutputRow::new(source_file, metadata, measurements, recognized)
    }
}

/// Fatal extraction errors abort the document. Anything else leaves the
/// report with no text, so it still yields a (failing) row.
fn degrade_non_fatal(
    source_file: &str,
    result: Result<DocumentText, ExtractionError>,
) -> Result<DocumentText, ProcessingError> {
    match result {
        Ok(text) => Ok(text),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            tracing::warn!(file = %source_file, error = %e, "Extraction degraded, no text");
            Ok(DocumentText::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build a `DocumentProcessor` with production implementations.
///
/// - OCR: `TesseractCli` at the configured path
/// - Text layer: `PdfTextExtractor`
/// - Rasterizer: `PdfiumRenderer`; without PDFium the OCR text stays empty
/// - Parser: the configured strategy over the canonical schema
pub fn build_processor(config: &AppConfig) -> DocumentProcessor {
    let tesseract = TesseractCli::new(config.tesseract_path.clone())
        .with_languages(&config.ocr_language)
        .with_page_seg_mode(config.page_seg_mode);
    match tesseract.verify() {
        Ok(version) => tracing::info!(version = %version, "Tesseract available"),
        Err(e) => tracing::warn!(error = %e, "Tesseract unavailable, OCR text will be empty"),
    }

    let mut extractor = DocumentExtractor::new(Box::new(tesseract), Box::new(PdfTextExtractor))
        .with_crop(config.crop)
        .with_dpi(config.render_dpi);
    match PdfiumRenderer::new(config.pdfium_library_path.clone()) {
        Ok(renderer) => extractor = extractor.with_pdf_renderer(Box::new(renderer)),
        Err(e) => tracing::warn!(error = %e, "PDFium unavailable, OCR disabled"),
    }

    let settings = ParserSettings::new(canonical_schema()).with_label_window(config.label_window);
    let parser = parser_for(config.parsing_strategy, settings);
    tracing::info!(strategy = %config.parsing_strategy, "Measurement parser selected");

    let processor = DocumentProcessor::new(extractor, parser)
        .with_recognition_keywords(config.recognition_keywords.clone());

    if config.ocr_debug {
        processor.with_debug_writer(Box::new(OcrTextDump))
    } else {
        processor
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
