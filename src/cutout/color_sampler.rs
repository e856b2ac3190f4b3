//! Background color estimation from fixed image regions.
//!
//! Two sampling modes exist:
//!
//! - **Corner mode** averages a small square in each image corner and yields
//!   up to four [`ColorSample`]s, one per corner that has any opaque pixel.
//! - **Rectangle mode** reads five points of a configured rectangle (its four
//!   corners and its center) and classifies the background as
//!   [`BackgroundTone::White`] or [`BackgroundTone::Black`] by mean brightness.
//!
//! Fully transparent pixels carry no reliable color and are never sampled.

use image::{Rgb, Rgba};
use imageproc::definitions::Image;
use itertools::iproduct;
use tracing::debug;

use crate::cutout::rect::Rect;
use crate::error::Error;
use crate::utils::{brightness, validate_non_empty_image};

/// Side length cap of the square averaged in each corner.
pub const MAX_CORNER_SAMPLE_SIZE: u32 = 10;

/// Default brightness cut between black and white backgrounds.
pub const DEFAULT_BRIGHTNESS_THRESHOLD: f32 = 128.0;

/// Mean background color over a sampled region.
///
/// Channels are kept as floating-point means; they are only reduced to
/// integers when a tolerance range is built from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample(pub [f32; 3]);

impl ColorSample {
    /// Inclusive per-channel range `[color - tolerance, color + tolerance]`.
    ///
    /// Bounds are computed in floating point, clamped into `[0, 255]` and then
    /// truncated, so they never wrap.
    pub fn range(&self, tolerance: u8) -> ([u8; 3], [u8; 3]) {
        let tolerance = f32::from(tolerance);
        let mut lower = [0u8; 3];
        let mut upper = [0u8; 3];
        for (c, &mean) in self.0.iter().enumerate() {
            lower[c] = (mean - tolerance).clamp(0.0, 255.0) as u8;
            upper[c] = (mean + tolerance).clamp(0.0, 255.0) as u8;
        }
        (lower, upper)
    }

    /// The sample rounded to an 8-bit color.
    pub fn to_rgb(&self) -> Rgb<u8> {
        let [r, g, b] = self.0;
        Rgb([
            r.round().clamp(0.0, 255.0) as u8,
            g.round().clamp(0.0, 255.0) as u8,
            b.round().clamp(0.0, 255.0) as u8,
        ])
    }
}

/// Light or dark background classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackgroundTone {
    #[default]
    White,
    Black,
}

impl BackgroundTone {
    /// Classifies a mean brightness against `threshold` (strictly greater is white).
    pub fn from_brightness(mean: f32, threshold: f32) -> Self {
        if mean > threshold {
            Self::White
        } else {
            Self::Black
        }
    }

    pub const fn is_white(self) -> bool {
        matches!(self, Self::White)
    }

    /// Solid color used to paint over erase zones on this background.
    pub const fn fill_color(self) -> Rgba<u8> {
        match self {
            Self::White => Rgba([255, 255, 255, 255]),
            Self::Black => Rgba([0, 0, 0, 255]),
        }
    }

    /// Name used in mockup template file names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

/// Size of the square averaged in each corner for a `width`x`height` image.
pub fn corner_sample_size(width: u32, height: u32) -> u32 {
    MAX_CORNER_SAMPLE_SIZE
        .min(height / 10)
        .min(width / 10)
        .max(1)
}

/// Trait providing background color sampling on RGBA images
pub trait SampleBackground {
    /// Mean color of each image corner.
    ///
    /// Corners are visited top-left, top-right, bottom-left, bottom-right.
    /// A corner whose square holds only fully transparent pixels yields no
    /// sample, so the result has between zero and four entries.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    fn corner_colors(&self) -> Result<Vec<ColorSample>, Error>;

    /// Classifies the background by the five sample points of `area`.
    ///
    /// Points outside the image, or fully transparent, are skipped. With no
    /// area, a degenerate area, or no usable point, the result is
    /// [`BackgroundTone::White`].
    fn tone_from_sample_area(&self, area: Option<&Rect>, threshold: f32) -> BackgroundTone;

    /// Classifies the background by the pixel one in from the bottom-left corner.
    ///
    /// Used when no sample area is configured for a source; falls back to
    /// [`BackgroundTone::White`] when the image is too small to have that pixel.
    fn tone_near_bottom_left(&self, threshold: f32) -> BackgroundTone;
}

impl SampleBackground for Image<Rgba<u8>> {
    fn corner_colors(&self) -> Result<Vec<ColorSample>, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        let size = corner_sample_size(width, height);
        let origins = [
            (0, 0),
            (width - size, 0),
            (0, height - size),
            (width - size, height - size),
        ];

        Ok(origins
            .iter()
            .filter_map(|&(x0, y0)| mean_opaque_color(self, x0, y0, size))
            .collect())
    }

    fn tone_from_sample_area(&self, area: Option<&Rect>, threshold: f32) -> BackgroundTone {
        let Some(area) = area else {
            return BackgroundTone::White;
        };
        if area.is_degenerate() {
            debug!(?area, "degenerate sample area, assuming white background");
            return BackgroundTone::White;
        }

        let (width, height) = self.dimensions();
        let values: Vec<f32> = area
            .sample_points()
            .iter()
            .filter(|&&(x, y)| x >= 0 && y >= 0 && x < i64::from(width) && y < i64::from(height))
            .map(|&(x, y)| *self.get_pixel(x as u32, y as u32))
            .filter(|&Rgba([_, _, _, alpha])| alpha > 0)
            .map(|Rgba([r, g, b, _])| brightness(r, g, b))
            .collect();

        if values.is_empty() {
            debug!(?area, "no sample point inside the image, assuming white background");
            return BackgroundTone::White;
        }

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        BackgroundTone::from_brightness(mean, threshold)
    }

    fn tone_near_bottom_left(&self, threshold: f32) -> BackgroundTone {
        let (width, height) = self.dimensions();
        if width < 2 || height < 2 {
            return BackgroundTone::White;
        }
        let Rgba([r, g, b, _]) = *self.get_pixel(1, height - 2);
        BackgroundTone::from_brightness(brightness(r, g, b), threshold)
    }
}

fn mean_opaque_color(image: &Image<Rgba<u8>>, x0: u32, y0: u32, size: u32) -> Option<ColorSample> {
    let mut sum = [0.0f32; 3];
    let mut count = 0u32;

    for (y, x) in iproduct!(y0..y0 + size, x0..x0 + size) {
        let Rgba([r, g, b, alpha]) = *image.get_pixel(x, y);
        if alpha == 0 {
            continue;
        }
        sum[0] += f32::from(r);
        sum[1] += f32::from(g);
        sum[2] += f32::from(b);
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let n = count as f32;
    Some(ColorSample([sum[0] / n, sum[1] / n, sum[2] / n]))
}
