//! Background removal strategies and the never-failing removal boundary.

use image::Rgba;
use imageproc::definitions::Image;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{HybridConfig, PipelineConfig};
use crate::cutout::edge_sharpen::{SharpenEdges, DEFAULT_SHARPEN_SIGMA};
use crate::cutout::hybrid_alpha::HybridAlpha;
use crate::cutout::mask_refine::{RefineMask, DEFAULT_REFINE_TARGET};
use crate::cutout::range_threshold::{RangeThreshold, DEFAULT_TOLERANCE};
use crate::cutout::region_grow::{RegionGrow, DEFAULT_CHANNEL_DELTA};
use crate::error::Error;

/// A background removal strategy.
///
/// Implementations never modify their input; the returned image has the same
/// dimensions with background pixels made transparent.
pub trait Segmenter {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Removes the background of `image`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operations reject, typically
    /// `Error::EmptyImage` or `Error::InvalidParameter`.
    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, Error>;
}

/// Corner-sampled range thresholding followed by refinement and sharpening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeThresholdSegmenter {
    pub tolerance: u8,
    pub refine_target: u32,
    pub sharpen_sigma: f32,
}

impl RangeThresholdSegmenter {
    pub const fn new(tolerance: u8, refine_target: u32) -> Self {
        Self {
            tolerance,
            refine_target,
            sharpen_sigma: DEFAULT_SHARPEN_SIGMA,
        }
    }
}

impl Default for RangeThresholdSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_REFINE_TARGET)
    }
}

impl Segmenter for RangeThresholdSegmenter {
    fn name(&self) -> &'static str {
        "range"
    }

    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, Error> {
        let mask = image.foreground_mask(self.tolerance)?;
        let refined = mask.refine_mask(self.refine_target)?;
        image.sharpen_with_mask(&refined, self.sharpen_sigma)
    }
}

/// Seeded flood fill from the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionGrowSegmenter {
    pub delta: u8,
}

impl Default for RegionGrowSegmenter {
    fn default() -> Self {
        Self {
            delta: DEFAULT_CHANNEL_DELTA,
        }
    }
}

impl Segmenter for RegionGrowSegmenter {
    fn name(&self) -> &'static str {
        "region"
    }

    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, Error> {
        image.region_grow(self.delta)
    }
}

/// Which [`Segmenter`] a pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationAlgorithm {
    #[default]
    Range,
    Region,
}

/// Trait providing background removal with explicit failure reporting
pub trait RemoveBackground {
    /// Range-threshold removal: corner sampling, refinement and sharpening.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has no pixels
    /// * `Error::InvalidParameter` - When every corner is fully transparent
    fn try_remove_background(&self, tolerance: u8, refine_target: u32) -> Result<Self, Error>
    where
        Self: Sized;
}

impl RemoveBackground for Image<Rgba<u8>> {
    fn try_remove_background(&self, tolerance: u8, refine_target: u32) -> Result<Self, Error> {
        RangeThresholdSegmenter::new(tolerance, refine_target).segment(self)
    }
}

/// Removes the background of `image`, never failing.
///
/// On any internal failure the failure is logged and `image` is returned
/// unchanged, so one bad item cannot stop a batch.
///
/// # Examples
///
/// ```no_run
/// use mockup_cutout::{remove_background, Image};
/// use image::{ImageBuffer, Rgba};
///
/// let photo: Image<Rgba<u8>> = ImageBuffer::new(640, 480);
/// let cutout = remove_background(photo, 30, 8000);
/// assert_eq!(cutout.dimensions(), (640, 480));
/// ```
pub fn remove_background(
    image: Image<Rgba<u8>>,
    tolerance: u8,
    refine_target: u32,
) -> Image<Rgba<u8>> {
    match image.try_remove_background(tolerance, refine_target) {
        Ok(cutout) => cutout,
        Err(err) => {
            warn!(error = %err, "background removal failed, keeping input unchanged");
            image
        }
    }
}

/// Configured removal pass: a segmenter plus an optional hybrid alpha step.
pub struct BackgroundRemover {
    segmenter: Box<dyn Segmenter + Send + Sync>,
    hybrid: Option<HybridConfig>,
}

impl BackgroundRemover {
    pub fn new(segmenter: Box<dyn Segmenter + Send + Sync>, hybrid: Option<HybridConfig>) -> Self {
        Self { segmenter, hybrid }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let segmenter: Box<dyn Segmenter + Send + Sync> = match config.algorithm {
            SegmentationAlgorithm::Range => Box::new(RangeThresholdSegmenter::new(
                config.tolerance,
                config.refine_target_px,
            )),
            SegmentationAlgorithm::Region => Box::new(RegionGrowSegmenter::default()),
        };
        Self::new(segmenter, config.hybrid)
    }

    pub fn segmenter_name(&self) -> &'static str {
        self.segmenter.name()
    }

    /// Runs the segmenter and, when configured, the hybrid alpha step.
    ///
    /// # Errors
    ///
    /// Any error of the segmenter or of [`HybridAlpha::hybrid_alpha`].
    pub fn try_process(&self, image: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, Error> {
        let cutout = self.segmenter.segment(image)?;
        match self.hybrid {
            Some(HybridConfig {
                blur_kernel,
                erode_kernel,
            }) => {
                debug!(blur_kernel, erode_kernel, "blending hybrid alpha");
                cutout.hybrid_alpha(blur_kernel, erode_kernel)
            }
            None => Ok(cutout),
        }
    }

    /// Like [`try_process`](Self::try_process) but returns `image` unchanged on
    /// failure, logging `label` (a file name or URL) so the item can be re-run.
    pub fn process(&self, image: Image<Rgba<u8>>, label: &str) -> Image<Rgba<u8>> {
        match self.try_process(&image) {
            Ok(cutout) => cutout,
            Err(err) => {
                warn!(
                    item = label,
                    segmenter = self.segmenter.name(),
                    error = %err,
                    "background removal failed, keeping input unchanged"
                );
                image
            }
        }
    }
}

impl Default for BackgroundRemover {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
