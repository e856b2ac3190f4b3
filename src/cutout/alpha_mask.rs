use image::{Luma, Rgba};
use imageproc::definitions::Image;
use imageproc::map::map_colors;

use crate::error::Error;
use crate::utils::validate_matching_dimensions;

/// Trait for reading and replacing the alpha channel of cutouts
///
/// Color channels are never touched; only the fourth channel is read or
/// written.
pub trait ModifyAlpha {
    /// Copies the alpha channel into a grayscale mask.
    fn extract_alpha(&self) -> Image<Luma<u8>>;

    /// Replaces the alpha channel with the provided mask
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mockup_cutout::{Image, ModifyAlpha};
    /// use image::{ImageBuffer, Rgba, Luma};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let cutout: Image<Rgba<u8>> = ImageBuffer::new(10, 10);
    /// let mask: Image<Luma<u8>> = ImageBuffer::new(10, 10);
    ///
    /// let updated = cutout.replace_alpha(&mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn replace_alpha(self, mask: &Image<Luma<u8>>) -> Result<Self, Error>
    where
        Self: Sized;

    /// Replaces the alpha channel with the provided mask in-place
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, Error>;
}

impl ModifyAlpha for Image<Rgba<u8>> {
    fn extract_alpha(&self) -> Image<Luma<u8>> {
        map_colors(self, |Rgba([_, _, _, alpha])| Luma([alpha]))
    }

    fn replace_alpha(mut self, mask: &Image<Luma<u8>>) -> Result<Self, Error> {
        self.replace_alpha_mut(mask)?;
        Ok(self)
    }

    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, Error> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, &Luma([alpha]))| pixel[3] = alpha);

        Ok(self)
    }
}
