use thiserror::Error;

/// Error type for mask and segmentation operations
///
/// This error type covers failures that can occur while sampling,
/// segmenting, refining or blending masks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Image and mask dimensions do not match
    ///
    /// This error occurs when a mask is merged into an image (or blended
    /// with another mask) whose dimensions don't align.
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The image has no pixels to work on
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a parameter value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Error type for INTER_AREA resize operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterAreaError {
    /// Target dimensions are zero
    #[error("Target dimensions must be non-zero, got {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// Source image is empty
    #[error("Source image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Area interpolation only decimates
    #[error("Upscaling from {src_width}x{src_height} to {target_width}x{target_height} is not supported by area interpolation")]
    UpscalingNotSupported {
        src_width: u32,
        src_height: u32,
        target_width: u32,
        target_height: u32,
    },
}

impl From<InterAreaError> for Error {
    fn from(err: InterAreaError) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}

/// Error type for a single item flowing through the batch pipeline
///
/// Each stage boundary (read, decode, segment, trim, composite) reports
/// through this type so that batch drivers can decide per item whether to
/// continue or trip the circuit breaker.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input bytes could not be decoded, or the output could not be encoded
    #[error("Image codec error: {0}")]
    Decode(#[from] image::ImageError),

    /// The configuration file is malformed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A core image operation rejected its input
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] Error),

    /// Nothing opaque was left after background removal
    #[error("Image is empty after trimming transparent background")]
    EmptyAfterTrim,

    /// A referenced mockup template does not exist
    #[error("Mockup not found: {0}")]
    MissingMockup(String),

    /// A mockup template or watermark exists but could not be decoded
    #[error("Cannot read template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// A finished image could not be written
    #[error("Cannot save {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

impl PipelineError {
    /// Whether this failure counts towards the consecutive I/O failure limit.
    ///
    /// Only failures to obtain the source image (read or decode) count.
    /// Failures after the source was fetched, including unreadable templates
    /// ([`Self::Template`]) and failed writes ([`Self::Save`]), do not.
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Decode(_))
    }
}

/// Result type for batch pipeline stages
pub type PipelineResult<T> = Result<T, PipelineError>;
