//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RunConfig`, drives one run, and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    run, FailurePolicy, OutputType, RunConfig, RunProgressCallback, RunReport,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const DISPLAY_TITLE: &str = r#"
         dP                         dP .8888b d8888b. oo
         88                         88 88   "     `88
88d888b. 88          88d888b. .d888b88 88aaa  .aaadP' dP 88d8b.d8b. .d8888b.
88'  `88 88 88888888 88'  `88 88'  `88 88     88'     88 88'`88'`88 88'  `88
88.  .88 88          88.  .88 88.  .88 88     88.     88 88  88  88 88.  .88
88Y888P' dP          88Y888P' `88888P8 dP     Y88888P dP dP  dP  dP `8888P88
88                   88                                                  .88
dP                   dP                                              d8888P
"#;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over documents, plus a log line per
/// document. Documents finish out of order when several workers run.
struct CliProgressCallback {
    bar: ProgressBar,
    input_root: PathBuf,
}

impl CliProgressCallback {
    fn new(input_root: PathBuf) -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for input files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, input_root })
    }

    fn display_name(&self, source: &Path) -> String {
        source
            .strip_prefix(&self.input_root)
            .unwrap_or(source)
            .display()
            .to_string()
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_tasks: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_tasks as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn on_task_start(&self, source: &Path) {
        self.bar.set_message(self.display_name(source));
    }

    fn on_task_complete(&self, source: &Path, pages: &[PathBuf]) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            self.display_name(source),
            dim(&format!("{} pages", pages.len())),
        ));
        self.bar.inc(1);
    }

    fn on_task_error(&self, source: &Path, error: &str) {
        // Keep one line per document.
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            self.display_name(source),
            red(first_line),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _report: &RunReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every PDF under incoming/ to JPEG pages under rendered/
  pdf2img incoming rendered

  # PNG output, only PDFs directly inside incoming/
  pdf2img --outputType png --pattern '*.pdf' incoming rendered

  # Four workers, stop at the first broken document
  pdf2img --workers 4 --fail-fast incoming rendered

  # Machine-readable run report
  pdf2img --json incoming rendered > report.json

OUTPUT NAMING:
  incoming/sub/dir/a.pdf  →  rendered/sub/dir/page-001-a.jpg
                              rendered/sub/dir/page-002-a.jpg
                              …

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium; otherwise the system library is used
  RUST_LOG                Log filter (overrides --verbose)
"#;

/// Convert the pages of every PDF in a directory tree to JPEG or PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert input PDF files to per-page jpg or png images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing (read-only) input files.
    inputdir: PathBuf,

    /// Directory where output files are written.
    outputdir: PathBuf,

    /// Format of output image files: jpg, jpeg or png.
    #[arg(long = "outputType", env = "PDF2IMG_OUTPUT_TYPE", default_value = "jpg")]
    output_type: String,

    /// Input file filter glob, relative to the input directory.
    #[arg(long, env = "PDF2IMG_PATTERN", default_value = "**/*.pdf")]
    pattern: String,

    /// Documents converted in parallel. Default: number of CPUs.
    #[arg(long, env = "PDF2IMG_WORKERS")]
    workers: Option<usize>,

    /// Rendering DPI (36–600).
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// JPEG quality (1–100). Ignored for png.
    #[arg(long, env = "PDF2IMG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Cap on the longest edge of a rendered page, in pixels.
    #[arg(long, env = "PDF2IMG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Start no new document after the first failure.
    #[arg(long, env = "PDF2IMG_FAIL_FAST")]
    fail_fast: bool,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs unless --verbose.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // Validated before the banner so a bad option fails without side effects.
    let mut config = build_config(&cli)?;

    if !cli.quiet && !cli.json {
        eprintln!("{}", cyan(DISPLAY_TITLE));
    }

    let progress = show_progress.then(|| CliProgressCallback::new(cli.inputdir.clone()));
    if let Some(ref cb) = progress {
        config.progress_callback = Some(cb.clone() as Arc<dyn RunProgressCallback>);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let report = match run(&config, &cli.inputdir, &cli.outputdir).await {
        Ok(report) => report,
        Err(e) => {
            // on_run_complete never fires for a run that could not start.
            if let Some(ref cb) = progress {
                cb.bar.finish_and_clear();
            }
            return Err(e).context("Conversion failed");
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report, &cli.outputdir);
    }

    report
        .into_result()
        .context("Some documents could not be converted")?;
    Ok(())
}

/// Map CLI args to `RunConfig`.
/// The progress callback is attached by the caller once the config is valid.
fn build_config(cli: &Cli) -> Result<RunConfig> {
    let output_type: OutputType = cli.output_type.parse().context("Invalid --outputType")?;

    let mut builder = RunConfig::builder()
        .output_type(output_type)
        .pattern(cli.pattern.clone())
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality)
        .failure_policy(if cli.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        });

    if let Some(n) = cli.workers {
        builder = builder.workers(n);
    }
    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib.clone());
    }
    builder.build().context("Invalid configuration")
}

fn print_summary(report: &RunReport, output_dir: &Path) {
    let mark = if report.failed == 0 {
        green("✔")
    } else if report.succeeded == 0 {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{}  {}/{} documents  {} pages  {}ms  →  {}",
        mark,
        report.succeeded,
        report.total_tasks,
        report.pages_written,
        report.duration_ms,
        bold(&output_dir.display().to_string()),
    );
    if report.failed > 0 || report.skipped > 0 {
        eprintln!(
            "   {} failed  /  {} skipped",
            red(&report.failed.to_string()),
            dim(&report.skipped.to_string()),
        );
        for failure in &report.failures {
            eprintln!(
                "   {} {}",
                red("✗"),
                dim(&failure.source.display().to_string())
            );
        }
    }
}
