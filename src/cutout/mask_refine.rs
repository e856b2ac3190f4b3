//! Silhouette refinement for binary foreground masks.
//!
//! A mask thresholded at its native resolution has a staircase boundary.
//! Refinement upsamples it by an integer factor with cubic interpolation,
//! re-binarizes, traces every contour (outer borders and hole borders) and
//! fills each traced polygon into a blank canvas, then decimates back to the
//! original size with area averaging and re-binarizes once more.
//!
//! Hole borders are filled like outer borders, so enclosed holes close and
//! only background outside the silhouette survives.

use image::imageops::{self, FilterType};
use image::Luma;
use imageproc::contours::find_contours;
use imageproc::definitions::Image;
use imageproc::drawing::draw_polygon_mut;
use imageproc::map::map_colors;
use imageproc::point::Point;
use itertools::Itertools;
use tracing::debug;

use crate::cutout::inter_area::InterAreaResizeExt;
use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Default long-edge resolution the mask is upsampled towards.
pub const DEFAULT_REFINE_TARGET: u32 = 8000;

/// Midpoint threshold: values strictly above become foreground.
pub const BINARY_THRESHOLD: u8 = 127;

const FOREGROUND: Luma<u8> = Luma([255]);

/// Integer upsampling factor for a `width`x`height` mask.
///
/// `max(1, floor(refine_target / max(width, height, 1)))`
pub fn upscale_factor(width: u32, height: u32, refine_target: u32) -> u32 {
    (refine_target / width.max(height).max(1)).max(1)
}

/// Maps every value above `threshold` to 255 and everything else to 0.
pub fn binarize(mask: &Image<Luma<u8>>, threshold: u8) -> Image<Luma<u8>> {
    map_colors(mask, |Luma([value])| {
        Luma([if value > threshold { 255 } else { 0 }])
    })
}

/// Trait providing contour-based refinement on foreground masks
pub trait RefineMask {
    /// Returns a refined mask with the same dimensions.
    ///
    /// When the mask is already at least `refine_target` pixels on its long
    /// edge the upscale factor is 1 and the mask is returned unchanged.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the mask has no pixels
    fn refine_mask(&self, refine_target: u32) -> Result<Self, Error>
    where
        Self: Sized;
}

impl RefineMask for Image<Luma<u8>> {
    fn refine_mask(&self, refine_target: u32) -> Result<Self, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        let factor = upscale_factor(width, height, refine_target);
        if factor == 1 {
            return Ok(self.clone());
        }

        let (up_width, up_height) = (width * factor, height * factor);
        debug!(width, height, factor, "refining mask at {up_width}x{up_height}");

        let upscaled = imageops::resize(self, up_width, up_height, FilterType::CatmullRom);
        let filled = fill_contours(&binarize(&upscaled, BINARY_THRESHOLD));
        let downscaled = filled.resize_area(width, height)?;

        Ok(binarize(&downscaled, BINARY_THRESHOLD))
    }
}

/// Traces all contours of a binary mask and rasterizes them filled.
fn fill_contours(binary: &Image<Luma<u8>>) -> Image<Luma<u8>> {
    let (width, height) = binary.dimensions();
    let mut canvas: Image<Luma<u8>> = Image::new(width, height);

    for contour in find_contours::<i32>(binary) {
        let polygon = open_polygon(&contour.points);
        if polygon.len() >= 3 {
            draw_polygon_mut(&mut canvas, &polygon, FOREGROUND);
        }
        // The border pixels themselves are foreground too; this also covers
        // one- and two-pixel contours that do not form a polygon.
        for point in &contour.points {
            canvas.put_pixel(point.x as u32, point.y as u32, FOREGROUND);
        }
    }

    canvas
}

/// Contour points without consecutive duplicates or a repeated closing point.
fn open_polygon(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = points.iter().copied().dedup().collect();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}
