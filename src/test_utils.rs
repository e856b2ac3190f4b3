//! Test utilities for mockup-cutout
//!
//! This module provides common image builders for unit tests.
//! It is only compiled when running tests.

use image::{Luma, Pixel, Rgba};
use imageproc::definitions::Image;

/// Creates an RGBA image filled with a single color.
pub fn create_solid_rgba_image(width: u32, height: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates a binary mask with a filled disc.
///
/// A pixel is foreground (255) when the distance from its coordinates to
/// `(center_x, center_y)` is at most `radius`.
pub fn create_disc_mask(
    width: u32,
    height: u32,
    center_x: f32,
    center_y: f32,
    radius: f32,
) -> Image<Luma<u8>> {
    Image::from_fn(width, height, |x, y| {
        let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
        Luma([if distance <= radius { 255 } else { 0 }])
    })
}

/// Counts pixels that differ between two images of equal size.
///
/// # Panics
///
/// Panics if the dimensions differ.
pub fn count_differing_pixels<P>(a: &Image<P>, b: &Image<P>) -> usize
where
    P: Pixel + PartialEq,
{
    assert_eq!(a.dimensions(), b.dimensions(), "image dimensions differ");
    a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_solid_rgba_image_fills_every_pixel() {
        let image = create_solid_rgba_image(3, 2, Rgba([1, 2, 3, 4]));
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|p| *p == Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn create_disc_mask_marks_inside_only() {
        let mask = create_disc_mask(11, 11, 5.0, 5.0, 3.0);
        assert_eq!(mask.get_pixel(5, 5), &Luma([255]));
        assert_eq!(mask.get_pixel(5, 2), &Luma([255]));
        assert_eq!(mask.get_pixel(5, 1), &Luma([0]));
        assert_eq!(mask.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn count_differing_pixels_counts_changes() {
        let a = create_disc_mask(8, 8, 4.0, 4.0, 2.0);
        let mut b = a.clone();
        assert_eq!(count_differing_pixels(&a, &b), 0);
        b.put_pixel(0, 0, Luma([9]));
        b.put_pixel(4, 4, Luma([9]));
        assert_eq!(count_differing_pixels(&a, &b), 2);
    }
}
