//! Geometric preparation of source artwork: cropping, erasing and rotation.

use image::{imageops, GenericImageView, Rgba};
use imageproc::definitions::Image;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::rect::Rect as FillRect;

use crate::cutout::rect::Rect;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Transparent border added around a source before free-angle rotation.
const ROTATION_MARGIN: u32 = 3;

/// Crops `rect` out of `image`, clipped to the image bounds.
///
/// Returns `None` when the rectangle misses the image entirely.
pub fn crop_rect(image: &Image<Rgba<u8>>, rect: &Rect) -> Option<Image<Rgba<u8>>> {
    let (width, height) = image.dimensions();
    let (x, y, w, h) = rect.clip_to(width, height)?;
    Some(image.view(x, y, w, h).to_image())
}

/// Paints every zone with `color`, clipped to the image bounds.
///
/// Used to cover watermarks or labels on the source with the background tone
/// before segmentation.
pub fn erase_areas(image: &mut Image<Rgba<u8>>, zones: &[Rect], color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    for (x, y, w, h) in zones.iter().filter_map(|zone| zone.clip_to(width, height)) {
        draw_filled_rect_mut(image, FillRect::at(x as i32, y as i32).of_size(w, h), color);
    }
}

/// Size of the bounding box of a `width`x`height` image rotated by `degrees`.
pub fn expanded_size(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f32, height as f32);
    // Snap near-integers so 90 degree turns swap dimensions exactly.
    let fit = |value: f32| ((value - 1e-3).ceil().max(1.0)) as u32;
    (
        fit(w * cos.abs() + h * sin.abs()),
        fit(w * sin.abs() + h * cos.abs()),
    )
}

/// Rotates counter-clockwise by `degrees` with bicubic sampling.
///
/// The output grows to hold the whole rotated image; uncovered pixels are
/// transparent. Multiples of 90 degrees are exact pixel moves, and a zero
/// angle returns an unchanged copy.
pub fn rotate_expand(image: &Image<Rgba<u8>>, degrees: f32) -> Image<Rgba<u8>> {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        return image.clone();
    }
    if turn == 90.0 {
        return imageops::rotate270(image);
    }
    if turn == 180.0 {
        return imageops::rotate180(image);
    }
    if turn == 270.0 {
        return imageops::rotate90(image);
    }

    let (width, height) = image.dimensions();
    let (out_width, out_height) = expanded_size(width, height, degrees);

    // Bicubic sampling yields the default for any point within two pixels of
    // the border, so the source gets a transparent margin wider than that.
    let mut padded: Image<Rgba<u8>> =
        Image::new(width + 2 * ROTATION_MARGIN, height + 2 * ROTATION_MARGIN);
    imageops::replace(
        &mut padded,
        image,
        i64::from(ROTATION_MARGIN),
        i64::from(ROTATION_MARGIN),
    );

    let center = |size: u32| (size as f32 - 1.0) / 2.0;
    // imageproc turns clockwise.
    let projection = Projection::translate(-center(padded.width()), -center(padded.height()))
        .and_then(Projection::rotate(-degrees.to_radians()))
        .and_then(Projection::translate(center(out_width), center(out_height)));

    let mut rotated: Image<Rgba<u8>> = Image::new(out_width, out_height);
    warp_into(
        &padded,
        &projection,
        Interpolation::Bicubic,
        TRANSPARENT,
        &mut rotated,
    );
    rotated
}
