pub mod batch;
pub mod config;
mod cutout;
mod error;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use batch::{run_group, CircuitBreaker, GroupReport};
pub use config::{
    HybridConfig, MockupColor, MockupSet, MockupVariant, MockupVariants, PipelineConfig,
};
pub use cutout::alpha_mask::ModifyAlpha;
pub use cutout::color_sampler::{
    corner_sample_size, BackgroundTone, ColorSample, SampleBackground,
    DEFAULT_BRIGHTNESS_THRESHOLD,
};
pub use cutout::compose::{
    add_watermark, apply_mockup, fit_in_frame, fit_to_canvas, place_on_canvas, CanvasSize,
    FramePlacement,
};
pub use cutout::edge_sharpen::{SharpenEdges, DEFAULT_SHARPEN_SIGMA};
pub use cutout::hybrid_alpha::{sigma_for_kernel, HybridAlpha};
pub use cutout::inter_area::InterAreaResizeExt;
pub use cutout::mask_refine::{binarize, upscale_factor, RefineMask, DEFAULT_REFINE_TARGET};
pub use cutout::range_threshold::{RangeThreshold, DEFAULT_TOLERANCE};
pub use cutout::rect::Rect;
pub use cutout::region_grow::{RegionGrow, DEFAULT_CHANNEL_DELTA};
pub use cutout::segmenter::{
    remove_background, BackgroundRemover, RangeThresholdSegmenter, RegionGrowSegmenter,
    RemoveBackground, SegmentationAlgorithm, Segmenter,
};
pub use cutout::transform::{crop_rect, erase_areas, expanded_size, rotate_expand};
pub use cutout::trim::TrimTransparent;
pub use error::{Error, InterAreaError, PipelineError, PipelineResult};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
