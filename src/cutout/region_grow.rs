//! Seeded flood-fill background removal.
//!
//! Starting from eight fixed seeds (the four corners and the four edge
//! midpoints), each seed's color becomes the reference for a 4-connected
//! flood fill. A neighbor joins the background when every color channel is
//! strictly closer than [`DEFAULT_CHANNEL_DELTA`] to the seed's channel.
//! Background pixels are cleared to fully transparent black.
//!
//! Pixels that no fill reaches stay opaque even when they match the
//! background color, e.g. background trapped inside a closed outline. The
//! range-threshold segmenter does not share that limitation.

use image::Rgba;
use imageproc::definitions::Image;
use tracing::debug;

use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Largest per-channel difference (exclusive) still treated as background.
pub const DEFAULT_CHANNEL_DELTA: u8 = 30;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Trait providing seeded flood-fill background removal on RGBA images
pub trait RegionGrow {
    /// Clears the background reachable from the edge seeds, in place.
    ///
    /// Returns the number of pixels made transparent.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    fn region_grow_mut(&mut self, delta: u8) -> Result<usize, Error>;

    /// Clears the background reachable from the edge seeds on a copy.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    fn region_grow(&self, delta: u8) -> Result<Self, Error>
    where
        Self: Sized;
}

impl RegionGrow for Image<Rgba<u8>> {
    fn region_grow_mut(&mut self, delta: u8) -> Result<usize, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        let mut visited = vec![false; width as usize * height as usize];
        let mut cleared = 0;

        for (seed_x, seed_y) in seed_points(width, height) {
            if visited[index(width, seed_x, seed_y)] {
                continue;
            }
            let Rgba([r, g, b, alpha]) = *self.get_pixel(seed_x, seed_y);
            if alpha == 0 {
                continue;
            }

            let filled = flood_fill(self, &mut visited, (seed_x, seed_y), [r, g, b], delta);
            debug!(seed_x, seed_y, filled, "flood fill from seed");
            cleared += filled;
        }

        Ok(cleared)
    }

    fn region_grow(&self, delta: u8) -> Result<Self, Error> {
        let mut image = self.clone();
        image.region_grow_mut(delta)?;
        Ok(image)
    }
}

/// Corners first, then edge midpoints.
fn seed_points(width: u32, height: u32) -> [(u32, u32); 8] {
    let right = width - 1;
    let bottom = height - 1;
    [
        (0, 0),
        (right, 0),
        (0, bottom),
        (right, bottom),
        (width / 2, 0),
        (width / 2, bottom),
        (0, height / 2),
        (right, height / 2),
    ]
}

#[inline]
const fn index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

#[inline]
fn matches_reference(pixel: &Rgba<u8>, reference: [u8; 3], delta: u8) -> bool {
    pixel.0[..3]
        .iter()
        .zip(reference.iter())
        .all(|(&c, &r)| c.abs_diff(r) < delta)
}

fn flood_fill(
    image: &mut Image<Rgba<u8>>,
    visited: &mut [bool],
    seed: (u32, u32),
    reference: [u8; 3],
    delta: u8,
) -> usize {
    let (width, height) = image.dimensions();
    let mut stack = vec![seed];
    let mut filled = 0;

    while let Some((x, y)) = stack.pop() {
        let i = index(width, x, y);
        if visited[i] || !matches_reference(image.get_pixel(x, y), reference, delta) {
            continue;
        }

        image.put_pixel(x, y, TRANSPARENT);
        visited[i] = true;
        filled += 1;

        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if x > 0 {
            stack.push((x - 1, y));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
    }

    filled
}
