use serde::{Deserialize, Serialize};

/// Integer region descriptor used for cropping, sampling and erasing.
///
/// The origin may lie outside the image (negative or past the edge); every
/// consumer clips against the image bounds itself. Deserializes from the
/// `{"x": .., "y": .., "w": .., "h": ..}` shape used by tool configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    #[serde(rename = "w")]
    pub width: u32,
    #[serde(rename = "h")]
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle with no area.
    pub const fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with an image of the given size as `(x, y, width, height)`.
    ///
    /// Returns `None` when the intersection is empty.
    pub fn clip_to(&self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = (self.x + i64::from(self.width)).min(i64::from(image_width));
        let bottom = (self.y + i64::from(self.height)).min(i64::from(image_height));

        if right <= left || bottom <= top {
            return None;
        }

        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// The four corners and the center, in that order.
    pub fn sample_points(&self) -> [(i64, i64); 5] {
        let right = self.x + i64::from(self.width) - 1;
        let bottom = self.y + i64::from(self.height) - 1;
        [
            (self.x, self.y),
            (right, self.y),
            (self.x, bottom),
            (right, bottom),
            (
                self.x + i64::from(self.width / 2),
                self.y + i64::from(self.height / 2),
            ),
        ]
    }
}
