//! Soft-edged masks with a guaranteed opaque core.
//!
//! Blurring a sharp mask feathers its silhouette but also lets transparency
//! bleed into thin solid regions. The hybrid mask starts from the blurred
//! mask and forces every pixel of the eroded ("core") mask back to 255, so
//! only a skirt around the boundary carries partial alpha.

use image::{Luma, Rgba};
use imageproc::definitions::Image;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::{map_colors, map_colors2};
use imageproc::morphology::erode;

use crate::cutout::alpha_mask::ModifyAlpha;
use crate::error::Error;
use crate::utils::{validate_non_empty_image, validate_odd_kernel};

const OPAQUE: u8 = 255;

/// Gaussian sigma OpenCV derives for a kernel of `size` when none is given.
pub fn sigma_for_kernel(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Trait providing hybrid (feathered edge, solid core) alpha masks
pub trait HybridAlpha {
    /// Builds the hybrid mask.
    ///
    /// # Arguments
    ///
    /// * `blur_kernel` - Odd Gaussian kernel size for the soft skirt
    /// * `erode_kernel` - Odd side of the square structuring element for the core
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the mask has no pixels
    /// * `Error::InvalidParameter` - When a kernel size is zero or even, or
    ///   the erosion kernel exceeds 511
    fn hybrid_alpha(&self, blur_kernel: u32, erode_kernel: u32) -> Result<Self, Error>
    where
        Self: Sized;
}

impl HybridAlpha for Image<Luma<u8>> {
    fn hybrid_alpha(&self, blur_kernel: u32, erode_kernel: u32) -> Result<Self, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;
        validate_odd_kernel(blur_kernel, "blur kernel")?;
        validate_odd_kernel(erode_kernel, "erode kernel")?;
        let radius = u8::try_from(erode_kernel / 2).map_err(|_| {
            Error::InvalidParameter(format!("erode kernel {erode_kernel} is too large"))
        })?;

        let soft = gaussian_blur_f32(self, sigma_for_kernel(blur_kernel));

        // A pixel is core when the whole square window around it is opaque.
        let solid = map_colors(self, |Luma([value])| {
            Luma([if value == OPAQUE { OPAQUE } else { 0 }])
        });
        let core = erode(&solid, Norm::LInf, radius);

        Ok(map_colors2(&soft, &core, |Luma([soft]), Luma([hard])| {
            Luma([if hard == OPAQUE { OPAQUE } else { soft }])
        }))
    }
}

impl HybridAlpha for Image<Rgba<u8>> {
    /// Replaces the alpha channel with the hybrid mask of the current alpha.
    fn hybrid_alpha(&self, blur_kernel: u32, erode_kernel: u32) -> Result<Self, Error> {
        let alpha = self.extract_alpha().hybrid_alpha(blur_kernel, erode_kernel)?;
        self.clone().replace_alpha(&alpha)
    }
}
