//! Scaled-down previews and the mapping between preview and original pixels.
//!
//! A preview is the original image shrunk (aspect ratio preserved, never
//! enlarged) to fit a display bounding box. Everything the user draws on it
//! is mapped back through [`PreviewScale::to_original`] before cropping.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::error::BulkCropError;
use crate::geometry::{CropRect, PreviewRect};

pub const DEFAULT_MAX_WIDTH: u32 = 1000;
pub const DEFAULT_MAX_HEIGHT: u32 = 700;

/// Overlay color used for the active selection.
pub const OVERLAY_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const OVERLAY_THICKNESS: u32 = 2;

/// Largest size a preview may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for PreviewBounds {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// The fixed relation between a preview and its original image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewScale {
    original_width: u32,
    original_height: u32,
    preview_width: u32,
    preview_height: u32,
    scale: f64,
}

impl PreviewScale {
    /// Computes the preview size for an image and the resulting scale factor
    /// (`original_width / preview_width`, at least 1).
    pub fn fit(original_width: u32, original_height: u32, bounds: PreviewBounds) -> Self {
        let ratio = (f64::from(bounds.max_width) / f64::from(original_width.max(1)))
            .min(f64::from(bounds.max_height) / f64::from(original_height.max(1)))
            .min(1.0);

        let (preview_width, preview_height) = if ratio < 1.0 {
            (
                ((f64::from(original_width) * ratio) as u32).max(1),
                ((f64::from(original_height) * ratio) as u32).max(1),
            )
        } else {
            (original_width, original_height)
        };

        let scale = if preview_width == 0 {
            1.0
        } else {
            f64::from(original_width) / f64::from(preview_width)
        };

        Self {
            original_width,
            original_height,
            preview_width,
            preview_height,
            scale,
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn original_size(&self) -> (u32, u32) {
        (self.original_width, self.original_height)
    }

    #[inline]
    pub fn preview_size(&self) -> (u32, u32) {
        (self.preview_width, self.preview_height)
    }

    /// Maps a preview rectangle to original pixels.
    ///
    /// Coordinates are scaled and rounded to nearest (halves to even), then
    /// clamped so the result is a non-empty rectangle inside the image. Returns `None` only for a
    /// zero-sized original image.
    pub fn to_original(&self, rect: &PreviewRect) -> Option<CropRect> {
        if self.original_width == 0 || self.original_height == 0 {
            return None;
        }

        let width = i64::from(self.original_width);
        let height = i64::from(self.original_height);
        let scaled = |v: f64| (v * self.scale).round_ties_even() as i64;

        let left = scaled(rect.x0).clamp(0, width - 1);
        let top = scaled(rect.y0).clamp(0, height - 1);
        let right = scaled(rect.x1).clamp(left + 1, width);
        let bottom = scaled(rect.y1).clamp(top + 1, height);

        CropRect::new(left as u32, top as u32, right as u32, bottom as u32)
    }

    /// Maps an original-space rectangle onto the preview (for drawing).
    pub fn to_preview(&self, rect: &CropRect) -> PreviewRect {
        PreviewRect::new(
            f64::from(rect.left()) / self.scale,
            f64::from(rect.top()) / self.scale,
            f64::from(rect.right()) / self.scale,
            f64::from(rect.bottom()) / self.scale,
        )
    }
}

/// Shrinks `image` to fit `bounds`, returning the preview and its scale.
pub fn render_preview(image: &DynamicImage, bounds: PreviewBounds) -> (DynamicImage, PreviewScale) {
    let (width, height) = image.dimensions();
    let scale = PreviewScale::fit(width, height, bounds);
    let (preview_width, preview_height) = scale.preview_size();

    let preview = if (preview_width, preview_height) == (width, height) {
        image.clone()
    } else {
        image.resize_exact(preview_width, preview_height, FilterType::Lanczos3)
    };

    tracing::debug!(
        width,
        height,
        preview_width,
        preview_height,
        scale = scale.scale(),
        "rendered preview"
    );
    (preview, scale)
}

/// Opens an image file and renders its preview.
pub fn load_preview(
    path: &Path,
    bounds: PreviewBounds,
) -> Result<(DynamicImage, PreviewScale), BulkCropError> {
    let image = image::open(path).map_err(|source| BulkCropError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(render_preview(&image, bounds))
}

/// Draws the outline of `rect` onto a preview canvas.
///
/// Edges falling outside the canvas are clipped.
pub fn draw_overlay(canvas: &mut RgbaImage, rect: &PreviewRect, color: Rgba<u8>, thickness: u32) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let to_px = |v: f64, max: u32| (v.round().max(0.0) as u32).min(max - 1);
    let x0 = to_px(rect.x0, width);
    let y0 = to_px(rect.y0, height);
    let x1 = to_px(rect.x1, width);
    let y1 = to_px(rect.y1, height);

    for t in 0..thickness {
        for x in x0..=x1 {
            for y in [y0.saturating_add(t), y1.saturating_sub(t)] {
                if y < height {
                    canvas.put_pixel(x, y, color);
                }
            }
        }
        for y in y0..=y1 {
            for x in [x0.saturating_add(t), x1.saturating_sub(t)] {
                if x < width {
                    canvas.put_pixel(x, y, color);
                }
            }
        }
    }
}
