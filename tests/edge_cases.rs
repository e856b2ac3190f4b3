//! Edge cases and error paths of the public API

use image::{Luma, Rgba};
use mockup_cutout::{
    crop_rect, fit_in_frame, remove_background, BackgroundRemover, Error, HybridAlpha,
    HybridConfig, Image, InterAreaError, InterAreaResizeExt, ModifyAlpha, RangeThreshold,
    RefineMask, RegionGrow, RegionGrowSegmenter, Rect, RemoveBackground, SampleBackground,
    SharpenEdges, TrimTransparent,
};

#[test]
fn empty_images_are_rejected_not_panicking() {
    let rgba: Image<Rgba<u8>> = Image::new(0, 5);
    let mask: Image<Luma<u8>> = Image::new(5, 0);

    assert!(matches!(rgba.corner_colors(), Err(Error::EmptyImage { .. })));
    assert!(matches!(rgba.foreground_mask(30), Err(Error::EmptyImage { .. })));
    assert!(matches!(rgba.region_grow(30), Err(Error::EmptyImage { .. })));
    assert!(matches!(mask.refine_mask(800), Err(Error::EmptyImage { .. })));
    assert!(matches!(mask.hybrid_alpha(3, 3), Err(Error::EmptyImage { .. })));
    assert!(rgba.trim_transparent().is_none());
}

#[test]
fn remove_background_never_fails() {
    let empty: Image<Rgba<u8>> = Image::new(0, 0);
    assert_eq!(remove_background(empty, 30, 8000).dimensions(), (0, 0));

    let transparent: Image<Rgba<u8>> = Image::from_pixel(12, 12, Rgba([9, 9, 9, 0]));
    assert_eq!(remove_background(transparent.clone(), 30, 96), transparent);
}

#[test]
fn single_pixel_image_becomes_background() {
    let image: Image<Rgba<u8>> = Image::from_pixel(1, 1, Rgba([200, 10, 10, 255]));

    let cutout = image.try_remove_background(30, 8).unwrap();
    assert_eq!(cutout.dimensions(), (1, 1));
    assert_eq!(cutout.get_pixel(0, 0)[3], 0);

    let mut flooded = image.clone();
    assert_eq!(flooded.region_grow_mut(30).unwrap(), 1);
    assert_eq!(flooded.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
}

#[test]
fn image_of_only_background_is_fully_transparent() {
    let image: Image<Rgba<u8>> = Image::from_pixel(30, 20, Rgba([50, 60, 70, 255]));
    let cutout = image.try_remove_background(30, 120).unwrap();
    assert!(cutout.pixels().all(|p| p[3] == 0));
    assert!(cutout.trim_transparent().is_none());
}

#[test]
fn zero_tolerance_only_matches_exact_corner_color() {
    let mut image: Image<Rgba<u8>> = Image::from_pixel(20, 20, Rgba([100, 100, 100, 255]));
    image.put_pixel(10, 10, Rgba([101, 100, 100, 255]));

    let mask = image.foreground_mask(0).unwrap();
    assert_eq!(mask.get_pixel(10, 10), &Luma([255]));
    assert_eq!(mask.get_pixel(9, 9), &Luma([0]));
}

#[test]
fn max_tolerance_treats_everything_as_background() {
    let mut image: Image<Rgba<u8>> = Image::from_pixel(20, 20, Rgba([128, 128, 128, 255]));
    image.put_pixel(10, 10, Rgba([0, 255, 0, 255]));
    let mask = image.foreground_mask(255).unwrap();
    assert!(mask.pixels().all(|&Luma([v])| v == 0));
}

#[test]
fn partially_transparent_corners_still_sample() {
    let mut image: Image<Rgba<u8>> = Image::from_pixel(40, 40, Rgba([0, 0, 0, 0]));
    for y in 36..40 {
        for x in 36..40 {
            image.put_pixel(x, y, Rgba([30, 30, 30, 255]));
        }
    }

    let samples = image.corner_colors().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].to_rgb().0, [30, 30, 30]);
}

#[test]
fn mismatched_mask_dimensions_are_reported() {
    let image: Image<Rgba<u8>> = Image::new(8, 8);
    let mask: Image<Luma<u8>> = Image::new(8, 9);

    assert!(matches!(
        image.sharpen_with_mask(&mask, 3.0),
        Err(Error::DimensionMismatch {
            expected: (8, 8),
            actual: (8, 9)
        })
    ));
    assert!(matches!(
        image.replace_alpha(&mask),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn hybrid_alpha_requires_odd_kernels() {
    let mask: Image<Luma<u8>> = Image::from_pixel(10, 10, Luma([255]));
    assert!(matches!(mask.hybrid_alpha(2, 3), Err(Error::InvalidParameter(_))));
    assert!(matches!(mask.hybrid_alpha(3, 2), Err(Error::InvalidParameter(_))));
    assert!(mask.hybrid_alpha(3, 3).is_ok());
}

#[test]
fn fully_opaque_mask_stays_opaque_through_hybrid_alpha() {
    let mask: Image<Luma<u8>> = Image::from_pixel(16, 16, Luma([255]));
    let hybrid = mask.hybrid_alpha(9, 5).unwrap();
    assert!(hybrid.pixels().all(|&Luma([v])| v == 255));
}

#[test]
fn area_resize_rejects_upscaling() {
    let image: Image<Luma<u8>> = Image::new(4, 4);
    assert!(matches!(
        image.resize_area(5, 4),
        Err(InterAreaError::UpscalingNotSupported { .. })
    ));
}

#[test]
fn crop_outside_image_is_none() {
    let image: Image<Rgba<u8>> = Image::new(10, 10);
    assert!(crop_rect(&image, &Rect::new(-20, -20, 5, 5)).is_none());
    assert!(crop_rect(&image, &Rect::new(0, 0, 10, 10)).is_some());
}

#[test]
fn degenerate_frame_is_rejected() {
    assert!(fit_in_frame(10, 10, &Rect::new(0, 0, 10, 0)).is_err());
}

#[test]
fn remover_with_invalid_hybrid_returns_input() {
    let remover = BackgroundRemover::new(
        Box::new(RegionGrowSegmenter::default()),
        Some(HybridConfig {
            blur_kernel: 0,
            erode_kernel: 3,
        }),
    );
    let image: Image<Rgba<u8>> = Image::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
    assert!(remover.try_process(&image).is_err());
    assert_eq!(remover.process(image.clone(), "flat.png"), image);
}
