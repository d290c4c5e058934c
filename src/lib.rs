//! # pdf2img
//!
//! Batch-convert PDF documents to per-page JPEG or PNG images.
//!
//! Point it at an input directory and an output directory: every file under
//! the input matching a glob (default `**/*.pdf`) is rasterised with pdfium,
//! and each page lands in the mirrored output directory as
//! `page-001-<name>.<ext>`, `page-002-<name>.<ext>`, …
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover  walk the tree, match the glob, map to output paths
//!  ├─ 2. Validate  reject files without a %PDF header
//!  ├─ 3. Render    rasterise every page via pdfium (spawn_blocking workers)
//!  ├─ 4. Encode    PNG, or JPEG at the configured quality
//!  └─ 5. Write     page-NNN-<name> next to the mirrored destination
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{run, OutputType, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .output_type(OutputType::Png)
//!         .build()?;
//!     let report = run(&config, "incoming", "rendered").await?;
//!     eprintln!("{} pages from {} documents", report.pages_written, report.succeeded);
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FailurePolicy, OutputType, RunConfig, RunConfigBuilder};
pub use convert::{run, run_sync, run_tasks, run_with_renderer};
pub use error::{ErrorKind, Pdf2ImgError, TaskFailure};
pub use output::{RunReport, TaskOutcome};
pub use pipeline::discover::{map_files, ConversionTask};
pub use pipeline::pages::{convert_task, page_output_path};
pub use pipeline::render::{PageRenderer, PdfiumRenderer};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
