//! Corner-sampled range segmentation.
//!
//! Every corner sample defines an inclusive per-channel box
//! `[color - tolerance, color + tolerance]` (clamped to `[0, 255]`). A pixel
//! whose RGB falls inside any box is background; the foreground mask is the
//! complement. Alpha does not take part in the classification.

use image::{Luma, Rgba};
use imageproc::definitions::Image;

use crate::cutout::color_sampler::{ColorSample, SampleBackground};
use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Default per-channel tolerance around each corner color.
pub const DEFAULT_TOLERANCE: u8 = 30;

type ChannelRange = ([u8; 3], [u8; 3]);

/// Trait providing range-threshold foreground masks on RGBA images
pub trait RangeThreshold {
    /// Binary foreground mask against explicit background samples.
    ///
    /// Background pixels are 0 and foreground pixels 255. With no samples
    /// every pixel is foreground.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    fn foreground_mask_from(
        &self,
        samples: &[ColorSample],
        tolerance: u8,
    ) -> Result<Image<Luma<u8>>, Error>;

    /// Binary foreground mask against the image's own corner colors.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    /// * `Error::InvalidParameter` - When every corner is fully transparent,
    ///   leaving no background color to segment against
    fn foreground_mask(&self, tolerance: u8) -> Result<Image<Luma<u8>>, Error>;
}

impl RangeThreshold for Image<Rgba<u8>> {
    fn foreground_mask_from(
        &self,
        samples: &[ColorSample],
        tolerance: u8,
    ) -> Result<Image<Luma<u8>>, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        let ranges: Vec<ChannelRange> = samples.iter().map(|s| s.range(tolerance)).collect();
        let mut mask: Image<Luma<u8>> = Image::new(width, height);
        let pixels: &[u8] = self;
        let values: &mut [u8] = &mut mask;

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            values
                .par_iter_mut()
                .zip(pixels.par_chunks_exact(4))
                .for_each(|(m, pixel)| *m = classify(pixel, &ranges));
        }

        #[cfg(not(feature = "rayon"))]
        values
            .iter_mut()
            .zip(pixels.chunks_exact(4))
            .for_each(|(m, pixel)| *m = classify(pixel, &ranges));

        Ok(mask)
    }

    fn foreground_mask(&self, tolerance: u8) -> Result<Image<Luma<u8>>, Error> {
        let samples = self.corner_colors()?;
        if samples.is_empty() {
            return Err(Error::InvalidParameter(
                "all corner regions are fully transparent".to_string(),
            ));
        }
        self.foreground_mask_from(&samples, tolerance)
    }
}

#[inline]
fn in_range(rgb: &[u8], (lower, upper): &ChannelRange) -> bool {
    rgb.iter()
        .zip(lower.iter().zip(upper.iter()))
        .all(|(&c, (&lo, &hi))| lo <= c && c <= hi)
}

#[inline]
fn classify(pixel: &[u8], ranges: &[ChannelRange]) -> u8 {
    if ranges.iter().any(|range| in_range(&pixel[..3], range)) {
        0
    } else {
        255
    }
}
