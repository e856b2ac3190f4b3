use image::{ImageBuffer, Luma, Rgb, Rgba};
use imageproc::definitions::Image;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::map_colors;

use crate::error::Error;
use crate::utils::{saturate_u8, validate_matching_dimensions, validate_non_empty_image};

/// Default Gaussian sigma of the unsharp mask.
pub const DEFAULT_SHARPEN_SIGMA: f32 = 3.0;

/// Weight of the original image in the unsharp mask.
pub const ORIGINAL_WEIGHT: f32 = 1.5;

/// Weight of the blurred copy in the unsharp mask.
pub const BLURRED_WEIGHT: f32 = -0.5;

/// Trait providing unsharp masking of color channels
///
/// Only the color channels are sharpened; the alpha channel of the result is
/// taken verbatim from the supplied mask so refined silhouette edges are not
/// disturbed.
pub trait SharpenEdges {
    /// Unsharp-masks RGB and merges `mask` as the alpha channel.
    ///
    /// `sharpened = 1.5 * original - 0.5 * gaussian(original, sigma)`,
    /// rounded and clamped to `[0, 255]` per channel.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    /// * `Error::InvalidParameter` - When `sigma` is not a positive finite number
    fn sharpen_with_mask(
        &self,
        mask: &Image<Luma<u8>>,
        sigma: f32,
    ) -> Result<Image<Rgba<u8>>, Error>;
}

impl SharpenEdges for Image<Rgba<u8>> {
    fn sharpen_with_mask(
        &self,
        mask: &Image<Luma<u8>>,
        sigma: f32,
    ) -> Result<Image<Rgba<u8>>, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sharpen sigma must be positive, got {sigma}"
            )));
        }

        // Blur in floating point so a flat region stays exactly flat.
        let color: Image<Rgb<f32>> = map_colors(self, |Rgba([r, g, b, _])| {
            Rgb([f32::from(r), f32::from(g), f32::from(b)])
        });
        let blurred = gaussian_blur_f32(&color, sigma);

        Ok(ImageBuffer::from_fn(width, height, |x, y| {
            let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
            let original = [r, g, b];
            let Rgb(soft) = *blurred.get_pixel(x, y);
            let Luma([alpha]) = *mask.get_pixel(x, y);
            Rgba([
                unsharp(original[0], soft[0]),
                unsharp(original[1], soft[1]),
                unsharp(original[2], soft[2]),
                alpha,
            ])
        }))
    }
}

#[inline]
fn unsharp(original: u8, blurred: f32) -> u8 {
    saturate_u8(ORIGINAL_WEIGHT * f32::from(original) + BLURRED_WEIGHT * blurred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_disc_mask, create_solid_rgba_image};

    #[test]
    fn unsharp_weights_and_saturates() {
        assert_eq!(unsharp(100, 100.0), 100);
        assert_eq!(unsharp(100, 99.99999), 100);
        assert_eq!(unsharp(200, 100.0), 250);
        assert_eq!(unsharp(250, 100.0), 255);
        assert_eq!(unsharp(10, 100.0), 0);
    }

    #[test]
    fn sharpen_keeps_mask_as_alpha() {
        let image = ImageBuffer::from_fn(32, 32, |x, y| {
            Rgba([(x * 8) as u8, (y * 8) as u8, 100, (x + y) as u8])
        });
        let mask = create_disc_mask(32, 32, 16.0, 16.0, 9.0);

        let result = image.sharpen_with_mask(&mask, DEFAULT_SHARPEN_SIGMA).unwrap();

        for (x, y, pixel) in result.enumerate_pixels() {
            assert_eq!(pixel[3], mask.get_pixel(x, y)[0]);
        }
    }

    #[test]
    fn sharpen_leaves_flat_color_unchanged() {
        let image = create_solid_rgba_image(20, 20, Rgba([90, 120, 200, 255]));
        let mask: Image<Luma<u8>> = Image::from_pixel(20, 20, Luma([255]));

        let result = image.sharpen_with_mask(&mask, DEFAULT_SHARPEN_SIGMA).unwrap();

        assert!(result.pixels().all(|p| *p == Rgba([90, 120, 200, 255])));
    }

    #[test]
    fn sharpen_increases_contrast_across_edges() {
        let image = ImageBuffer::from_fn(40, 10, |x, _| {
            let v = if x < 20 { 60 } else { 180 };
            Rgba([v, v, v, 255])
        });
        let mask: Image<Luma<u8>> = Image::from_pixel(40, 10, Luma([255]));

        let result = image.sharpen_with_mask(&mask, DEFAULT_SHARPEN_SIGMA).unwrap();

        assert!(result.get_pixel(19, 5)[0] < 60);
        assert!(result.get_pixel(20, 5)[0] > 180);
    }

    #[test]
    fn sharpen_rejects_bad_input() {
        let image = create_solid_rgba_image(4, 4, Rgba([0, 0, 0, 255]));
        let small_mask: Image<Luma<u8>> = Image::new(2, 2);
        let mask: Image<Luma<u8>> = Image::new(4, 4);

        assert!(matches!(
            image.sharpen_with_mask(&small_mask, 3.0),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            image.sharpen_with_mask(&mask, 0.0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
