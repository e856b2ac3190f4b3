use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use image::Rgba;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mockup_cutout::{
    add_watermark, apply_mockup, crop_rect, erase_areas, place_on_canvas, rotate_expand,
    run_group, BackgroundRemover, BackgroundTone, CanvasSize, Error, Image, MockupSet,
    PipelineConfig, PipelineError, PipelineResult, Rect, SampleBackground, TrimTransparent,
};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

#[derive(Parser)]
#[command(name = "cutout")]
#[command(about = "Remove flat backgrounds from artwork and place it on print canvases or mockups")]
struct Cli {
    /// Input image files or directories (each directory is one batch group)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tolerance to run with; repeat to produce one output per tolerance
    #[arg(short, long)]
    tolerance: Vec<u8>,

    /// Long-edge resolution used for edge refinement
    #[arg(long)]
    refine_target: Option<u32>,

    /// Place the cutout on the configured print canvas (4200x4800 if unset)
    #[arg(long)]
    canvas: bool,

    /// Counter-clockwise rotation in degrees applied to each cutout before trimming
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotate: f32,

    /// Rectangle `x,y,w,h` to crop each input to before removal
    #[arg(long, value_parser = parse_rect)]
    crop: Option<Rect>,

    /// Rectangle `x,y,w,h` to paint with the background tone before removal; repeatable
    #[arg(long, value_parser = parse_rect)]
    erase: Vec<Rect>,

    /// Composite onto this mockup set from the configuration
    #[arg(long)]
    mockup_set: Option<String>,

    /// Directory holding mockup templates and watermark images
    #[arg(long, default_value = "mockup")]
    mockup_dir: PathBuf,

    /// Seed for mockup variant selection
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cutout=info,mockup_cutout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(target) = cli.refine_target {
        config.refine_target_px = target;
    }
    if cli.canvas && config.canvas.is_none() {
        config.canvas = Some(CanvasSize::default());
    }
    let mockup_set = cli
        .mockup_set
        .as_deref()
        .map(|name| config.mockup_set(name).map(|set| (name, set.clone())))
        .transpose()?;

    let tolerances = if cli.tolerance.is_empty() {
        vec![config.tolerance]
    } else {
        cli.tolerance.clone()
    };

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let job = Job {
        config: &config,
        tolerances: &tolerances,
        rotate: cli.rotate,
        crop: cli.crop,
        erase: &cli.erase,
        mockup: mockup_set.as_ref().map(|(name, set)| (*name, set)),
        mockup_dir: &cli.mockup_dir,
        output_dir: &cli.output_dir,
    };

    let mut totals = (0, 0, 0);
    for (group, files) in collect_groups(&cli.inputs)? {
        let report = run_group(
            &group,
            files,
            config.failure_threshold,
            |path| path.display().to_string(),
            |path| job.run(path, &mut rng),
        );
        totals.0 += report.processed;
        totals.1 += report.failed;
        totals.2 += report.skipped;
    }

    info!(
        processed = totals.0,
        failed = totals.1,
        skipped = totals.2,
        "batch finished"
    );
    Ok(())
}

/// Everything one item needs, borrowed from the parsed arguments.
struct Job<'a> {
    config: &'a PipelineConfig,
    tolerances: &'a [u8],
    rotate: f32,
    crop: Option<Rect>,
    erase: &'a [Rect],
    mockup: Option<(&'a str, &'a MockupSet)>,
    mockup_dir: &'a Path,
    output_dir: &'a Path,
}

impl Job<'_> {
    fn run(&self, path: &Path, rng: &mut StdRng) -> PipelineResult<()> {
        let label = path.display().to_string();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let (source, tone) = self.prepare(image::open(path)?.to_rgba8())?;

        for &tolerance in self.tolerances {
            let trimmed = self.cutout(&source, tolerance, &label)?;

            let processed = match self.config.canvas {
                Some(canvas) => place_on_canvas(&trimmed, canvas)?,
                None => trimmed.clone(),
            };
            let output = self.output_dir.join(output_file_name(&stem, tolerance, "processed"));
            save(&processed, &output)?;

            if let Some((name, set)) = self.mockup {
                let variant = set.variants_for(tone).choose(rng).ok_or_else(|| {
                    PipelineError::MissingMockup(format!("{name}_{}", tone.as_str()))
                })?;
                let mockup = load_rgba(&self.mockup_dir.join(&variant.file))?;
                let mut composed = apply_mockup(&trimmed, &mockup, &set.frame)?;
                if let Some(watermark) = &set.watermark {
                    add_watermark(&mut composed, &load_rgba(&self.mockup_dir.join(watermark))?);
                }
                let output = self.output_dir.join(output_file_name(&stem, tolerance, name));
                save(&composed, &output)?;
            }
        }

        info!(item = %label, background = tone.as_str(), "done");
        Ok(())
    }

    /// Crops the source, detects its background tone and paints the erase
    /// zones with that tone.
    fn prepare(
        &self,
        mut source: Image<Rgba<u8>>,
    ) -> PipelineResult<(Image<Rgba<u8>>, BackgroundTone)> {
        if let Some(rect) = &self.crop {
            source = crop_rect(&source, rect).ok_or_else(|| {
                Error::InvalidParameter(format!("crop {rect:?} misses the image"))
            })?;
        }

        let threshold = self.config.brightness_threshold;
        let tone = match &self.config.sample_area {
            Some(area) => source.tone_from_sample_area(Some(area), threshold),
            None => source.tone_near_bottom_left(threshold),
        };
        if !self.erase.is_empty() {
            erase_areas(&mut source, self.erase, tone.fill_color());
        }
        Ok((source, tone))
    }

    /// Removes the background, then rotates and trims the cutout.
    ///
    /// Rotation comes after removal: it adds transparent corners, which
    /// would leave the corner sampler without a background color.
    fn cutout(
        &self,
        source: &Image<Rgba<u8>>,
        tolerance: u8,
        label: &str,
    ) -> PipelineResult<Image<Rgba<u8>>> {
        let remover = BackgroundRemover::from_config(&PipelineConfig {
            tolerance,
            ..self.config.clone()
        });
        let cutout = remover.process(source.clone(), label);
        rotate_expand(&cutout, self.rotate)
            .trim_transparent()
            .ok_or(PipelineError::EmptyAfterTrim)
    }
}

fn output_file_name(stem: &str, tolerance: u8, suffix: &str) -> String {
    format!("{stem}_tol{tolerance}_{suffix}.png")
}

fn load_rgba(path: &Path) -> PipelineResult<Image<Rgba<u8>>> {
    if !path.exists() {
        return Err(PipelineError::MissingMockup(path.display().to_string()));
    }
    let template = image::open(path).map_err(|source| PipelineError::Template {
        path: path.display().to_string(),
        source,
    })?;
    Ok(template.to_rgba8())
}

fn save(image: &Image<Rgba<u8>>, path: &Path) -> PipelineResult<()> {
    image.save(path).map_err(|source| PipelineError::Save {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "saved");
    Ok(())
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,w,h, got {value:?}"));
    };
    let int = |s: &str| s.parse::<i64>().map_err(|e| format!("{s:?}: {e}"));
    let size = |s: &str| s.parse::<u32>().map_err(|e| format!("{s:?}: {e}"));
    Ok(Rect::new(int(*x)?, int(*y)?, size(*w)?, size(*h)?))
}

/// Groups inputs: each directory is a group of its images, loose files share one group.
fn collect_groups(inputs: &[PathBuf]) -> anyhow::Result<Vec<(String, Vec<PathBuf>)>> {
    let mut groups = Vec::new();
    let mut loose = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("reading {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| is_image(path))
                .collect();
            files.sort();
            groups.push((input.display().to_string(), files));
        } else {
            loose.push(input.clone());
        }
    }

    if !loose.is_empty() {
        groups.push(("files".to_string(), loose));
    }
    Ok(groups)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
