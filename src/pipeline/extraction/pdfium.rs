//! PDF page rasterization via Google PDFium.
//!
//! Renders one page to a PNG at a fixed DPI so the measurement crop lands on
//! the same pixels from report to report.
//!
//! `PdfiumRenderer` is stateless apart from the configured library path. Each
//! operation binds a fresh `Pdfium` instance because the upstream type is
//! `!Send`; the OS caches `dlopen`/`LoadLibrary` calls, so repeat loads are
//! near-free.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PdfPageRenderer;
use super::ExtractionError;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// Default rasterization resolution. The default crop region is expressed
/// in pixels of an A4 page at this DPI.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages to PNG images using Google PDFium.
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
}

impl PdfiumRenderer {
    /// Create a renderer, verifying the PDFium library is loadable.
    ///
    /// Discovery order:
    /// 1. `library_path` (from configuration)
    /// 2. Alongside the running executable
    /// 3. System library search paths
    pub fn new(library_path: Option<PathBuf>) -> Result<Self, ExtractionError> {
        let _ = load_pdfium(library_path.as_deref())?;
        Ok(Self { library_path })
    }
}

fn load_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ExtractionError> {
    // 1. Explicit path from configuration. Accepts either the library file or
    //    the directory holding it.
    if let Some(path) = library_path {
        let lib = if path.is_dir() {
            PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(
                path.to_string_lossy().as_ref(),
            ))
        } else {
            path.to_path_buf()
        };
        let lib = lib.to_string_lossy().into_owned();
        debug!(path = %lib, "Loading PDFium from configured path");
        let bindings = Pdfium::bind_to_library(&lib).map_err(|e| ExtractionError::PdfRendering {
            page: 0,
            reason: format!("Failed to load PDFium from {lib}: {e}"),
        })?;
        return Ok(Pdfium::new(bindings));
    }

    // 2. Alongside the executable (portable installs).
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium next to executable");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    // 3. System library
    let bindings =
        Pdfium::bind_to_system_library().map_err(|e| ExtractionError::PdfRendering {
            page: 0,
            reason: format!(
                "PDFium library not found. Set pdfium_library_path or PDFIUM_DYNAMIC_LIB_PATH: {e}"
            ),
        })?;
    Ok(Pdfium::new(bindings))
}

fn map_load_error(e: PdfiumError) -> ExtractionError {
    ExtractionError::PdfRendering {
        page: 0,
        reason: format!("Failed to load PDF: {e}"),
    }
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium(self.library_path.as_deref())?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();

        let page_index = u16::try_from(page_number).map_err(|_| ExtractionError::PdfRendering {
            page: page_number,
            reason: format!("Page index {page_number} exceeds u16 maximum"),
        })?;

        let page = pages
            .get(page_index)
            .map_err(|_| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!(
                    "Page {page_number} out of range (document has {} pages)",
                    pages.len()
                ),
            })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, dpi);

        let uncapped_w = (width_points * dpi as f32 / POINTS_PER_INCH) as u32;
        let uncapped_h = (height_points * dpi as f32 / POINTS_PER_INCH) as u32;
        if target_w != uncapped_w || target_h != uncapped_h {
            warn!(
                page = page_number,
                raw_width = uncapped_w,
                raw_height = uncapped_h,
                capped_width = target_w,
                capped_height = target_h,
                "Page dimensions capped to {MAX_DIMENSION_PX}px",
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("Rendering failed: {e}"),
            })?;

        let png_bytes = encode_png(&bitmap.as_image())?;

        debug!(
            page = page_number,
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "Rendered PDF page to PNG"
        );

        Ok(png_bytes)
    }
}

/// PNG-encode an image for the OCR hand-off.
pub fn encode_png(img: &image::DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

// ── Mock for testing ──────────────────────────────────────

/// Mock renderer returning a blank white page of a fixed pixel size.
///
/// Lets the orchestrator and crop tests run without the PDFium binary.
pub struct MockPdfPageRenderer {
    page_count: usize,
    width: u32,
    height: u32,
}

impl MockPdfPageRenderer {
    /// A4 at 300 DPI.
    pub fn new(page_count: usize) -> Self {
        Self::with_size(page_count, 2480, 3508)
    }

    pub fn with_size(page_count: usize, width: u32, height: u32) -> Self {
        Self {
            page_count,
            width,
            height,
        }
    }
}

impl PdfPageRenderer for MockPdfPageRenderer {
    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_number: usize,
        _dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        if page_number >= self.page_count {
            return Err(ExtractionError::PdfRendering {
                page: page_number,
                reason: format!(
                    "Page {page_number} out of range (mock has {} pages)",
                    self.page_count
                ),
            });
        }
        let page = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            self.width,
            self.height,
            image::Luma([255u8]),
        ));
        encode_png(&page)
    }
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    // ── Pure dimension logic tests (no PDFium needed) ──

    #[test]
    fn a4_at_300dpi() {
        let (w, h) = compute_render_dimensions(595.0, 842.0, 300);
        // 595 * 300/72 ~ 2479, 842 * 300/72 ~ 3508
        assert!(w > 2470 && w < 2490, "A4 width at 300dpi: got {w}");
        assert!(h > 3500 && h < 3515, "A4 height at 300dpi: got {h}");
    }

    #[test]
    fn letter_at_300dpi() {
        // US Letter = 612 x 792 points
        let (w, h) = compute_render_dimensions(612.0, 792.0, 300);
        assert!(w > 2540 && w < 2560, "Letter width at 300dpi: got {w}");
        assert!(h > 3290 && h < 3310, "Letter height at 300dpi: got {h}");
    }

    #[test]
    fn dimension_guard_caps_oversized() {
        let (w, h) = compute_render_dimensions(5000.0, 7000.0, 300);
        assert!(w <= MAX_DIMENSION_PX, "Width {w} exceeds {MAX_DIMENSION_PX}");
        assert!(h <= MAX_DIMENSION_PX, "Height {h} exceeds {MAX_DIMENSION_PX}");
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn dimension_guard_preserves_aspect_ratio() {
        let (w, h) = compute_render_dimensions(5000.0, 10000.0, 300);
        let ratio = h as f32 / w as f32;
        assert!((ratio - 2.0).abs() < 0.15, "Aspect ratio should be ~2:1, got {ratio}");
    }

    #[test]
    fn zero_points_clamped_to_1() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 300);
        assert!(w >= 1, "Width must be >= 1, got {w}");
        assert!(h >= 1, "Height must be >= 1, got {h}");
    }

    // ── Mock renderer tests ──

    #[test]
    fn mock_returns_png_of_configured_size() {
        let mock = MockPdfPageRenderer::with_size(1, 620, 877);
        let png = mock.render_page(&[], 0, 300).unwrap();
        assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47]);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (620, 877));
    }

    #[test]
    fn mock_errors_for_out_of_range() {
        let mock = MockPdfPageRenderer::new(2);
        let err = mock.render_page(&[], 2, 300).unwrap_err();
        assert!(matches!(err, ExtractionError::PdfRendering { page: 2, .. }));
    }
}
