use image::{GenericImageView, Rgba};
use imageproc::definitions::Image;

/// Trait for cropping a cutout to its visible content
pub trait TrimTransparent {
    /// Bounding box `(x, y, width, height)` of all pixels with alpha above 0.
    ///
    /// Returns `None` when every pixel is fully transparent.
    fn alpha_bounds(&self) -> Option<(u32, u32, u32, u32)>;

    /// Crops to [`alpha_bounds`](Self::alpha_bounds).
    ///
    /// Returns `None` for a fully transparent image so callers can skip it.
    fn trim_transparent(&self) -> Option<Self>
    where
        Self: Sized;
}

impl TrimTransparent for Image<Rgba<u8>> {
    fn alpha_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let (width, height) = self.dimensions();
        let mut bounds = [width, height, 0, 0]; // [x1, y1, x2, y2]
        let mut found = false;

        for (x, y, pixel) in self.enumerate_pixels() {
            if pixel[3] > 0 {
                update_bounds(&mut bounds, x, y);
                found = true;
            }
        }

        found.then(|| {
            (
                bounds[0],
                bounds[1],
                bounds[2] - bounds[0] + 1,
                bounds[3] - bounds[1] + 1,
            )
        })
    }

    fn trim_transparent(&self) -> Option<Self> {
        let (x, y, width, height) = self.alpha_bounds()?;
        Some(self.view(x, y, width, height).to_image())
    }
}

fn update_bounds(bounds: &mut [u32; 4], x: u32, y: u32) {
    bounds[0] = bounds[0].min(x);
    bounds[1] = bounds[1].min(y);
    bounds[2] = bounds[2].max(x);
    bounds[3] = bounds[3].max(y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_solid_rgba_image;

    #[test]
    fn trim_transparent_crops_to_visible_pixels() {
        let mut image = create_solid_rgba_image(20, 10, Rgba([0, 0, 0, 0]));
        image.put_pixel(3, 2, Rgba([1, 2, 3, 1]));
        image.put_pixel(15, 7, Rgba([4, 5, 6, 255]));

        assert_eq!(image.alpha_bounds(), Some((3, 2, 13, 6)));

        let trimmed = image.trim_transparent().unwrap();
        assert_eq!(trimmed.dimensions(), (13, 6));
        assert_eq!(trimmed.get_pixel(0, 0), &Rgba([1, 2, 3, 1]));
        assert_eq!(trimmed.get_pixel(12, 5), &Rgba([4, 5, 6, 255]));
    }

    #[test]
    fn trim_transparent_ignores_color_of_transparent_pixels() {
        let mut image = create_solid_rgba_image(8, 8, Rgba([255, 255, 255, 0]));
        image.put_pixel(4, 4, Rgba([0, 0, 0, 200]));
        assert_eq!(image.trim_transparent().unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn trim_transparent_of_opaque_image_is_identity() {
        let image = create_solid_rgba_image(5, 6, Rgba([7, 7, 7, 255]));
        assert_eq!(image.trim_transparent(), Some(image.clone()));
    }

    #[test]
    fn trim_transparent_of_empty_content_is_none() {
        let image = create_solid_rgba_image(5, 5, Rgba([9, 9, 9, 0]));
        assert_eq!(image.alpha_bounds(), None);
        assert!(image.trim_transparent().is_none());
    }
}
