//! Internal utility functions for mockup-cutout.
//!
//! This module contains validation and arithmetic helpers shared by the
//! segmentation, refinement and compositing operations.

use crate::error::Error;

/// Clamps a floating-point channel value into `[0, 255]` and rounds it.
///
/// Rounding matches saturating 8-bit arithmetic: `127.5` becomes `128`.
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Mean brightness of an RGB triple, the arithmetic mean of its channels.
#[inline]
pub fn brightness(red: u8, green: u8, blue: u8) -> f32 {
    (f32::from(red) + f32::from(green) + f32::from(blue)) / 3.0
}

/// Validates that an image has non-zero dimensions.
///
/// # Errors
///
/// `Error::EmptyImage` if either dimension is zero
pub const fn validate_non_empty_image(width: u32, height: u32) -> Result<(), Error> {
    if width == 0 || height == 0 {
        Err(Error::EmptyImage { width, height })
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Errors
///
/// `Error::DimensionMismatch` if the dimensions differ
pub const fn validate_matching_dimensions(
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), Error> {
    if expected.0 != actual.0 || expected.1 != actual.1 {
        Err(Error::DimensionMismatch { expected, actual })
    } else {
        Ok(())
    }
}

/// Validates that a kernel size is odd and non-zero.
///
/// # Errors
///
/// `Error::InvalidParameter` naming the offending kernel
pub fn validate_odd_kernel(size: u32, name: &str) -> Result<(), Error> {
    if size == 0 || size % 2 == 0 {
        Err(Error::InvalidParameter(format!(
            "{name} must be a positive odd number, got {size}"
        )))
    } else {
        Ok(())
    }
}
