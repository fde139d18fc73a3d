//! Measurement-region crop for OCR.
//!
//! The region is defined in pixels of a reference page (A4 at 300 DPI by
//! default) and scaled per axis to the page size actually rendered, so a
//! report rendered at another resolution still crops the same block.

use image::GenericImageView;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pdfium::encode_png;
use super::ExtractionError;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Crop rectangle plus the reference page size it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub rect: PixelRect,
    pub base_width: u32,
    pub base_height: u32,
}

impl Default for CropRegion {
    /// Measurement block of the SECA mBCA single-page report, A4 at 300 DPI.
    fn default() -> Self {
        Self {
            rect: PixelRect {
                x: 118,
                y: 1180,
                width: 2244,
                height: 2090,
            },
            base_width: 2480,
            base_height: 3508,
        }
    }
}

impl CropRegion {
    /// Scale the rectangle to an actual page size.
    ///
    /// `scaled = raw * (actual / base)` independently for x and y, truncated
    /// to whole pixels. A zero base dimension leaves that axis unscaled.
    pub fn scale_to(&self, actual_width: u32, actual_height: u32) -> PixelRect {
        let sx = axis_ratio(actual_width, self.base_width);
        let sy = axis_ratio(actual_height, self.base_height);
        PixelRect {
            x: (self.rect.x as f64 * sx) as u32,
            y: (self.rect.y as f64 * sy) as u32,
            width: (self.rect.width as f64 * sx) as u32,
            height: (self.rect.height as f64 * sy) as u32,
        }
    }

    /// Scale to the page, then clamp to its bounds.
    ///
    /// Fails when nothing of the rectangle is left inside the page.
    pub fn resolve(&self, page_width: u32, page_height: u32) -> Result<PixelRect, ExtractionError> {
        let scaled = self.scale_to(page_width, page_height);
        let out_of_bounds = || ExtractionError::CropOutOfBounds {
            region: scaled.to_string(),
            width: page_width,
            height: page_height,
        };

        if scaled.x >= page_width || scaled.y >= page_height {
            return Err(out_of_bounds());
        }
        let width = scaled.width.min(page_width - scaled.x);
        let height = scaled.height.min(page_height - scaled.y);
        if width == 0 || height == 0 {
            return Err(out_of_bounds());
        }

        Ok(PixelRect {
            x: scaled.x,
            y: scaled.y,
            width,
            height,
        })
    }
}

fn axis_ratio(actual: u32, base: u32) -> f64 {
    if base == 0 {
        1.0
    } else {
        actual as f64 / base as f64
    }
}

/// Decode a rendered page, cut out the measurement region, re-encode as PNG.
pub fn crop_page_image(page_png: &[u8], region: &CropRegion) -> Result<Vec<u8>, ExtractionError> {
    let page = image::load_from_memory(page_png).map_err(|e| {
        ExtractionError::ImageProcessing(format!("Failed to decode rendered page: {e}"))
    })?;
    let (page_width, page_height) = page.dimensions();
    let rect = region.resolve(page_width, page_height)?;

    debug!(
        page_width,
        page_height,
        crop = %rect,
        "Cropping measurement region"
    );

    let cropped = page.crop_imm(rect.x, rect.y, rect.width, rect.height);
    encode_png(&cropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: u32, y: u32, width: u32, height: u32) -> CropRegion {
        CropRegion {
            rect: PixelRect {
                x,
                y,
                width,
                height,
            },
            base_width: 1000,
            base_height: 2000,
        }
    }

    fn blank_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            width,
            height,
            image::Luma([255u8]),
        ));
        encode_png(&img).unwrap()
    }

    #[test]
    fn same_size_is_identity() {
        let r = region(100, 200, 300, 400);
        assert_eq!(r.scale_to(1000, 2000), r.rect);
    }

    #[test]
    fn scales_axes_independently() {
        let r = region(100, 200, 300, 400);
        let scaled = r.scale_to(500, 3000);
        assert_eq!(
            scaled,
            PixelRect {
                x: 50,
                y: 300,
                width: 150,
                height: 600
            }
        );
    }

    #[test]
    fn truncates_fractional_pixels() {
        let r = region(3, 3, 3, 3);
        // 3 * 0.5 = 1.5 -> 1 ; 3 * 0.75 = 2.25 -> 2
        let scaled = r.scale_to(500, 1500);
        assert_eq!(
            scaled,
            PixelRect {
                x: 1,
                y: 2,
                width: 1,
                height: 2
            }
        );
    }

    #[test]
    fn zero_base_leaves_axis_unscaled() {
        let r = CropRegion {
            rect: PixelRect {
                x: 10,
                y: 10,
                width: 10,
                height: 10,
            },
            base_width: 0,
            base_height: 0,
        };
        assert_eq!(r.scale_to(999, 999), r.rect);
    }

    #[test]
    fn resolve_clamps_overhanging_rect() {
        let r = region(900, 1900, 300, 300);
        let rect = r.resolve(1000, 2000).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 900,
                y: 1900,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn resolve_rejects_rect_outside_page() {
        let r = region(1200, 100, 50, 50);
        let err = r.resolve(1000, 2000).unwrap_err();
        assert!(matches!(err, ExtractionError::CropOutOfBounds { width: 1000, .. }));
    }

    #[test]
    fn resolve_rejects_degenerate_rect() {
        let r = region(10, 10, 0, 50);
        assert!(r.resolve(1000, 2000).is_err());
    }

    #[test]
    fn crop_page_image_produces_scaled_png() {
        let png = blank_png(500, 1000);
        let cropped = crop_page_image(&png, &region(100, 200, 400, 600)).unwrap();
        let decoded = image::load_from_memory(&cropped).unwrap();
        assert_eq!(decoded.dimensions(), (200, 300));
    }

    #[test]
    fn crop_page_image_rejects_undecodable_bytes() {
        let err = crop_page_image(b"not an image", &CropRegion::default()).unwrap_err();
        assert!(matches!(err, ExtractionError::ImageProcessing(_)));
    }

    #[test]
    fn default_region_fits_a4_at_300dpi() {
        let rect = CropRegion::default().resolve(2480, 3508).unwrap();
        assert_eq!(rect, CropRegion::default().rect);
    }
}
