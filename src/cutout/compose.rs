//! Placement of finished cutouts onto mockups and print canvases.

use image::imageops::{self, FilterType};
use image::Rgba;
use imageproc::definitions::Image;
use serde::{Deserialize, Serialize};

use crate::cutout::rect::Rect;
use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Widest a watermark may be drawn; wider ones are scaled down.
pub const MAX_WATERMARK_WIDTH: u32 = 280;

/// Distance between the watermark and the right edge.
pub const WATERMARK_MARGIN_RIGHT: i64 = 20;

/// Distance between the watermark and the bottom edge.
pub const WATERMARK_MARGIN_BOTTOM: i64 = 50;

/// Size of a print canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 4200,
            height: 4800,
        }
    }
}

/// Scaled size and paste offset of a design inside a mockup frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlacement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

/// Fits a `width`x`height` design inside `frame`.
///
/// The design is scaled by `min(frame.w / width, frame.h / height)` and
/// always sits on the frame's top edge. It is centered horizontally only
/// when height is the limiting dimension; otherwise it hugs the left edge.
///
/// # Errors
///
/// * `Error::EmptyImage` - When the design has no pixels
/// * `Error::InvalidParameter` - When the frame has no area
pub fn fit_in_frame(width: u32, height: u32, frame: &Rect) -> Result<FramePlacement, Error> {
    validate_non_empty_image(width, height)?;
    if frame.is_degenerate() {
        return Err(Error::InvalidParameter(format!(
            "mockup frame {}x{} has no area",
            frame.width, frame.height
        )));
    }

    let scale_w = f64::from(frame.width) / f64::from(width);
    let scale_h = f64::from(frame.height) / f64::from(height);
    let scale = scale_w.min(scale_h);

    let fitted_width = ((f64::from(width) * scale) as u32).max(1);
    let fitted_height = ((f64::from(height) * scale) as u32).max(1);

    let x = if scale_h < scale_w {
        frame.x + (i64::from(frame.width) - i64::from(fitted_width)) / 2
    } else {
        frame.x
    };

    Ok(FramePlacement {
        width: fitted_width,
        height: fitted_height,
        x,
        y: frame.y,
    })
}

/// Scales a trimmed design into `frame` and alpha-composites it onto a copy
/// of `mockup`.
///
/// # Errors
///
/// * `Error::EmptyImage` - When the design has no pixels
/// * `Error::InvalidParameter` - When the frame has no area
pub fn apply_mockup(
    design: &Image<Rgba<u8>>,
    mockup: &Image<Rgba<u8>>,
    frame: &Rect,
) -> Result<Image<Rgba<u8>>, Error> {
    let (width, height) = design.dimensions();
    let placement = fit_in_frame(width, height, frame)?;

    let resized = imageops::resize(
        design,
        placement.width,
        placement.height,
        FilterType::Lanczos3,
    );
    let mut composed = mockup.clone();
    imageops::overlay(&mut composed, &resized, placement.x, placement.y);
    Ok(composed)
}

/// Size a design takes when fitted to a canvas by aspect ratio.
///
/// A design wider than the canvas (relative to its height) spans the full
/// canvas width; otherwise it spans the full canvas height. The result may
/// be larger than the design.
pub fn fit_to_canvas(width: u32, height: u32, canvas: CanvasSize) -> (u32, u32) {
    let design_aspect = f64::from(width) / f64::from(height);
    let canvas_aspect = f64::from(canvas.width) / f64::from(canvas.height);

    if design_aspect > canvas_aspect {
        let fitted_height = (f64::from(canvas.width) / design_aspect) as u32;
        (canvas.width, fitted_height.max(1))
    } else {
        let fitted_width = (f64::from(canvas.height) * design_aspect) as u32;
        (fitted_width.max(1), canvas.height)
    }
}

/// Scales a design onto a transparent print canvas, centered horizontally and
/// flush with the top edge.
///
/// # Errors
///
/// * `Error::EmptyImage` - When the design or the canvas has no pixels
pub fn place_on_canvas(
    design: &Image<Rgba<u8>>,
    canvas: CanvasSize,
) -> Result<Image<Rgba<u8>>, Error> {
    let (width, height) = design.dimensions();
    validate_non_empty_image(width, height)?;
    validate_non_empty_image(canvas.width, canvas.height)?;

    let (target_width, target_height) = fit_to_canvas(width, height, canvas);
    let scaled = imageops::resize(design, target_width, target_height, FilterType::Lanczos3);

    let mut output: Image<Rgba<u8>> = Image::new(canvas.width, canvas.height);
    let x = i64::from((canvas.width - target_width) / 2);
    imageops::overlay(&mut output, &scaled, x, 0);
    Ok(output)
}

/// Alpha-composites an image watermark near the bottom-right corner.
///
/// Watermarks wider than [`MAX_WATERMARK_WIDTH`] are scaled down with their
/// aspect ratio kept. The top-left corner lands at
/// `(W - w - 20, H - h - 50)`; parts falling outside the image are clipped.
pub fn add_watermark(image: &mut Image<Rgba<u8>>, watermark: &Image<Rgba<u8>>) {
    let (mark_width, mark_height) = watermark.dimensions();
    if mark_width == 0 || mark_height == 0 {
        return;
    }

    let scaled;
    let mark = if mark_width > MAX_WATERMARK_WIDTH {
        let scale = f64::from(MAX_WATERMARK_WIDTH) / f64::from(mark_width);
        let height = ((f64::from(mark_height) * scale) as u32).max(1);
        scaled = imageops::resize(watermark, MAX_WATERMARK_WIDTH, height, FilterType::Lanczos3);
        &scaled
    } else {
        watermark
    };

    let (width, height) = image.dimensions();
    let x = i64::from(width) - i64::from(mark.width()) - WATERMARK_MARGIN_RIGHT;
    let y = i64::from(height) - i64::from(mark.height()) - WATERMARK_MARGIN_BOTTOM;
    imageops::overlay(image, mark, x, y);
}
