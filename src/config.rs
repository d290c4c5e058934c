//! Configuration types for a batch conversion run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. The configuration is constructed once at startup and
//! passed by reference into [`crate::convert::run`]; nothing in the crate
//! reads process-wide settings.

use crate::error::Pdf2ImgError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Glob used to discover input files when none is given.
pub const DEFAULT_PATTERN: &str = "**/*.pdf";

/// Render resolution used when none is given.
pub const DEFAULT_DPI: u32 = 200;

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Image format written for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// JPEG with a `.jpg` extension. (default)
    #[default]
    Jpg,
    /// JPEG with a `.jpeg` extension.
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputType {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Jpg => "jpg",
            OutputType::Jpeg => "jpeg",
            OutputType::Png => "png",
        }
    }

    /// File suffix including the leading dot, e.g. `.png`.
    pub fn suffix(self) -> String {
        format!(".{}", self.extension())
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputType::Jpg | OutputType::Jpeg => image::ImageFormat::Jpeg,
            OutputType::Png => image::ImageFormat::Png,
        }
    }
}

impl FromStr for OutputType {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(OutputType::Jpg),
            "jpeg" => Ok(OutputType::Jpeg),
            "png" => Ok(OutputType::Png),
            other => Err(Pdf2ImgError::InvalidConfig(format!(
                "Output type must be one of jpg, jpeg or png, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What the driver does once a task has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Attempt every task and record each failure. (default)
    #[default]
    BestEffort,
    /// Start no new task after the first failure; the rest are skipped.
    FailFast,
}

/// Configuration for one batch conversion run.
///
/// Built via [`RunConfig::builder()`] or using [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2img::{OutputType, RunConfig};
///
/// let config = RunConfig::builder()
///     .output_type(OutputType::Png)
///     .pattern("reports/**/*.pdf")
///     .workers(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunk_size(10), 2);
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Image format of every page file. Default: [`OutputType::Jpg`].
    pub output_type: OutputType,

    /// Glob selecting input files, relative to the input root. Default: `**/*.pdf`.
    ///
    /// Not validated up front: a pattern that fails to compile matches nothing.
    pub pattern: String,

    /// Number of chunks converted concurrently. Default: detected CPU count.
    pub workers: usize,

    /// Render resolution. Range: 36–600. Default: 200.
    pub dpi: u32,

    /// Optional cap on the longest rendered edge in pixels.
    ///
    /// A 600-DPI render of a poster-sized page can run to tens of thousands
    /// of pixels per side; the cap scales such pages down proportionally.
    pub max_rendered_pixels: Option<u32>,

    /// JPEG quality, 1–100. Ignored for PNG. Default: 75.
    pub jpeg_quality: u8,

    /// Behaviour after a task fails. Default: [`FailurePolicy::BestEffort`].
    pub failure_policy: FailurePolicy,

    /// Explicit pdfium shared library. If None, the system library is used.
    pub pdfium_library: Option<PathBuf>,

    /// Observer notified as tasks start and finish.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_type: OutputType::default(),
            pattern: DEFAULT_PATTERN.to_string(),
            workers: default_worker_count(),
            dpi: DEFAULT_DPI,
            max_rendered_pixels: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            failure_policy: FailurePolicy::default(),
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("output_type", &self.output_type)
            .field("pattern", &self.pattern)
            .field("workers", &self.workers)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("failure_policy", &self.failure_policy)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// Number of contiguous tasks handed to a worker at a time.
    pub fn chunk_size(&self, task_count: usize) -> usize {
        (task_count / self.workers.max(1)).max(1)
    }
}

/// Available parallelism of the host, at least 1.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn output_type(mut self, output_type: OutputType) -> Self {
        self.config.output_type = output_type;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(36, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px.max(100));
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, Pdf2ImgError> {
        let c = &self.config;
        if c.workers == 0 {
            return Err(Pdf2ImgError::InvalidConfig("Workers must be ≥ 1".into()));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}
