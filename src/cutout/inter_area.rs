use image::{ImageBuffer, Pixel};
use imageproc::definitions::Image;

use crate::error::InterAreaError;
use crate::utils::saturate_u8;

/// Contribution of one source index to one destination index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AreaWeight {
    source_index: u32,
    weight: f32,
}

/// Per-destination weight lists for area decimation along one axis.
///
/// Destination cell `d` covers the source interval `[d * scale, (d + 1) * scale)`;
/// each source pixel contributes its overlap with that interval, normalized
/// by the interval length so the weights of one cell sum to 1.
fn area_weights(src_size: u32, dst_size: u32) -> Vec<Vec<AreaWeight>> {
    let scale = f64::from(src_size) / f64::from(dst_size);

    (0..dst_size)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (start + scale).min(f64::from(src_size));
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_size);
            let length = end - start;

            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(f64::from(s) + 1.0) - start.max(f64::from(s));
                    (overlap > 1e-6).then(|| AreaWeight {
                        source_index: s,
                        weight: (overlap / length) as f32,
                    })
                })
                .collect()
        })
        .collect()
}

/// Extension trait providing OpenCV `INTER_AREA` style downsampling.
///
/// Each destination pixel is the area-weighted mean of the source pixels its
/// footprint covers, rounded to the nearest 8-bit value. Only decimation is
/// supported.
pub trait InterAreaResizeExt {
    /// Resize image using area interpolation.
    ///
    /// # Errors
    ///
    /// * `InterAreaError::InvalidTargetDimensions` - When a target dimension is zero
    /// * `InterAreaError::EmptyImage` - When the source has no pixels
    /// * `InterAreaError::UpscalingNotSupported` - When a target dimension exceeds the source
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Self, InterAreaError>
    where
        Self: Sized;
}

impl<P> InterAreaResizeExt for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Self, InterAreaError> {
        if new_width == 0 || new_height == 0 {
            return Err(InterAreaError::InvalidTargetDimensions {
                width: new_width,
                height: new_height,
            });
        }

        let (src_width, src_height) = self.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(InterAreaError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        if new_width > src_width || new_height > src_height {
            return Err(InterAreaError::UpscalingNotSupported {
                src_width,
                src_height,
                target_width: new_width,
                target_height: new_height,
            });
        }

        if (new_width, new_height) == (src_width, src_height) {
            return Ok(self.clone());
        }

        let x_weights = area_weights(src_width, new_width);
        let y_weights = area_weights(src_height, new_height);
        let channels = usize::from(P::CHANNEL_COUNT);

        let mut output: Image<P> = ImageBuffer::new(new_width, new_height);
        for (dy, ys) in y_weights.iter().enumerate() {
            for (dx, xs) in x_weights.iter().enumerate() {
                let mut sum = [0.0f32; 4];
                for y in ys {
                    for x in xs {
                        let weight = y.weight * x.weight;
                        let source = self.get_pixel(x.source_index, y.source_index);
                        for (acc, &value) in sum.iter_mut().zip(source.channels()) {
                            *acc += f32::from(value) * weight;
                        }
                    }
                }

                let target = output.get_pixel_mut(dx as u32, dy as u32);
                for (value, acc) in target.channels_mut().iter_mut().zip(&sum[..channels]) {
                    *value = saturate_u8(*acc);
                }
            }
        }

        Ok(output)
    }
}
