//! Pipeline configuration, loaded once from JSON and passed explicitly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cutout::color_sampler::{BackgroundTone, DEFAULT_BRIGHTNESS_THRESHOLD};
use crate::cutout::compose::CanvasSize;
use crate::cutout::mask_refine::DEFAULT_REFINE_TARGET;
use crate::cutout::range_threshold::DEFAULT_TOLERANCE;
use crate::cutout::rect::Rect;
use crate::cutout::segmenter::SegmentationAlgorithm;
use crate::error::{PipelineError, PipelineResult};

/// Consecutive I/O failures after which a group is abandoned.
pub const DEFAULT_FAILURE_THRESHOLD: usize = 5;

/// Kernel sizes of the hybrid alpha step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridConfig {
    pub blur_kernel: u32,
    pub erode_kernel: u32,
}

/// Settings for one pipeline run.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tolerance: u8,
    pub refine_target_px: u32,
    pub brightness_threshold: f32,
    pub failure_threshold: usize,
    pub algorithm: SegmentationAlgorithm,
    pub hybrid: Option<HybridConfig>,
    pub canvas: Option<CanvasSize>,
    pub sample_area: Option<Rect>,
    pub mockup_sets: BTreeMap<String, MockupSet>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            refine_target_px: DEFAULT_REFINE_TARGET,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            algorithm: SegmentationAlgorithm::default(),
            hybrid: None,
            canvas: None,
            sample_area: None,
            mockup_sets: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// * `PipelineError::Config` - When the JSON is malformed
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// * `PipelineError::Io` - When the file cannot be read
    /// * `PipelineError::Config` - When the JSON is malformed
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Looks up a mockup set by name.
    ///
    /// # Errors
    ///
    /// * `PipelineError::MissingMockup` - When no set has that name
    pub fn mockup_set(&self, name: &str) -> PipelineResult<&MockupSet> {
        self.mockup_sets
            .get(name)
            .ok_or_else(|| PipelineError::MissingMockup(name.to_string()))
    }
}

/// One selectable mockup template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockupVariant {
    pub file: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Mockup templates for one background tone as written in config files:
/// either a single file name or a list of variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MockupColor {
    SingleFile(String),
    VariantList(Vec<MockupVariant>),
}

/// Normalized, non-empty list of mockup variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MockupColor", into = "MockupColor")]
pub struct MockupVariants(Vec<MockupVariant>);

impl From<MockupColor> for MockupVariants {
    fn from(color: MockupColor) -> Self {
        match color {
            MockupColor::SingleFile(file) => Self(vec![MockupVariant { file, label: None }]),
            MockupColor::VariantList(variants) => Self(variants),
        }
    }
}

impl From<MockupVariants> for MockupColor {
    fn from(variants: MockupVariants) -> Self {
        Self::VariantList(variants.0)
    }
}

impl MockupVariants {
    pub fn as_slice(&self) -> &[MockupVariant] {
        &self.0
    }

    /// Picks one variant uniformly with the injected random source.
    ///
    /// Returns `None` for an empty variant list.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&MockupVariant> {
        self.0.choose(rng)
    }
}

/// A mockup template family: the frame the design is pasted into and the
/// template files for white and black backgrounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockupSet {
    #[serde(rename = "coords")]
    pub frame: Rect,
    pub white: MockupVariants,
    pub black: MockupVariants,
    #[serde(default)]
    pub watermark: Option<String>,
}

impl MockupSet {
    pub const fn variants_for(&self, tone: BackgroundTone) -> &MockupVariants {
        match tone {
            BackgroundTone::White => &self.white,
            BackgroundTone::Black => &self.black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE: &str = r#"{
        "tolerance": 60,
        "algorithm": "region",
        "hybrid": { "blur_kernel": 21, "erode_kernel": 15 },
        "canvas": { "width": 4200, "height": 4800 },
        "mockup_sets": {
            "tee": {
                "coords": { "x": 300, "y": 250, "w": 600, "h": 700 },
                "white": "tee_white.jpg",
                "black": [
                    { "file": "tee_black_front.jpg", "label": "front" },
                    { "file": "tee_black_folded.jpg" }
                ],
                "watermark": "logo.png"
            }
        }
    }"#;

    #[test]
    fn empty_object_uses_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.tolerance, 30);
        assert_eq!(config.refine_target_px, 8000);
        assert_eq!(config.failure_threshold, 5);
        assert!(config.hybrid.is_none());
    }

    #[test]
    fn parses_full_config() {
        let config = PipelineConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.tolerance, 60);
        assert_eq!(config.algorithm, SegmentationAlgorithm::Region);
        assert_eq!(
            config.hybrid,
            Some(HybridConfig {
                blur_kernel: 21,
                erode_kernel: 15
            })
        );

        let tee = config.mockup_set("tee").unwrap();
        assert_eq!(tee.frame, Rect::new(300, 250, 600, 700));
        assert_eq!(tee.watermark.as_deref(), Some("logo.png"));
    }

    #[test]
    fn mockup_colors_normalize_both_shapes() {
        let config = PipelineConfig::from_json_str(SAMPLE).unwrap();
        let tee = config.mockup_set("tee").unwrap();

        let white = tee.variants_for(BackgroundTone::White).as_slice();
        assert_eq!(white.len(), 1);
        assert_eq!(white[0].file, "tee_white.jpg");
        assert_eq!(white[0].label, None);

        let black = tee.variants_for(BackgroundTone::Black).as_slice();
        assert_eq!(black.len(), 2);
        assert_eq!(black[0].label.as_deref(), Some("front"));
    }

    #[test]
    fn variant_choice_is_deterministic_with_seeded_rng() {
        let config = PipelineConfig::from_json_str(SAMPLE).unwrap();
        let black = config.mockup_set("tee").unwrap().variants_for(BackgroundTone::Black);

        let first: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..8).map(|_| black.choose(&mut rng).unwrap().file.clone()).collect()
        };
        let second: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..8).map(|_| black.choose(&mut rng).unwrap().file.clone()).collect()
        };
        assert_eq!(first, second);
        assert!(first.iter().all(|f| f.starts_with("tee_black")));
    }

    #[test]
    fn missing_mockup_set_is_reported() {
        let config = PipelineConfig::default();
        assert!(matches!(
            config.mockup_set("mug"),
            Err(PipelineError::MissingMockup(name)) if name == "mug"
        ));
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            PipelineConfig::from_json_str("{\"tolerance\": \"high\"}"),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PipelineConfig::from_path("/nonexistent/cutout.json").unwrap_err();
        assert!(err.is_io());
    }
}
