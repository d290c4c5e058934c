//! Run entry points: discover tasks, fan them out, collect a report.
//!
//! ## Worker model
//!
//! The task list is cut into contiguous chunks of
//! [`RunConfig::chunk_size`] tasks. Each chunk runs to completion on a tokio
//! blocking thread (`spawn_blocking`), converting its tasks one after another;
//! at most [`RunConfig::workers`] chunks are in flight at once
//! (`buffer_unordered`). Tasks share nothing but the renderer, the progress
//! observer and, under [`FailurePolicy::FailFast`], a stop flag.
//!
//! ## Failures
//!
//! A failed task never aborts its siblings mid-flight. Under
//! [`FailurePolicy::BestEffort`] every task is attempted; under
//! [`FailurePolicy::FailFast`] tasks that have not started when the first
//! failure lands are skipped. Either way the run returns `Ok(RunReport)`;
//! call [`RunReport::into_result`] to treat failures as an error.

use crate::config::{FailurePolicy, RunConfig};
use crate::error::{Pdf2ImgError, TaskFailure};
use crate::output::{RunReport, TaskOutcome};
use crate::pipeline::discover::{self, ConversionTask};
use crate::pipeline::pages;
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert every PDF under `input_dir` matching `config.pattern` into page
/// images under `output_dir`, rendering with pdfium.
///
/// # Errors
/// Returns `Err` only for run-level problems, before any task starts:
/// - the input directory does not exist
/// - the pdfium library cannot be bound (checked only when there is work)
///
/// Per-document failures are reported in [`RunReport::failures`].
pub async fn run(
    config: &RunConfig,
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<RunReport, Pdf2ImgError> {
    let tasks = discover_tasks(config, input_dir.as_ref(), output_dir.as_ref()).await?;

    let renderer = PdfiumRenderer::new(
        config.pdfium_library.clone(),
        config.dpi,
        config.max_rendered_pixels,
    );
    if !tasks.is_empty() {
        let probe = renderer.clone();
        tokio::task::spawn_blocking(move || probe.probe())
            .await
            .map_err(|e| Pdf2ImgError::Internal(format!("pdfium probe panicked: {}", e)))??;
    }

    Ok(run_tasks(tasks, config, Arc::new(renderer)).await)
}

/// Like [`run`], with a caller-supplied renderer.
pub async fn run_with_renderer(
    config: &RunConfig,
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    renderer: Arc<dyn PageRenderer>,
) -> Result<RunReport, Pdf2ImgError> {
    let tasks = discover_tasks(config, input_dir.as_ref(), output_dir.as_ref()).await?;
    Ok(run_tasks(tasks, config, renderer).await)
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    config: &RunConfig,
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<RunReport, Pdf2ImgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config, input_dir, output_dir))
}

/// Convert an already-built task list.
pub async fn run_tasks(
    tasks: Vec<ConversionTask>,
    config: &RunConfig,
    renderer: Arc<dyn PageRenderer>,
) -> RunReport {
    let start = Instant::now();
    let total_tasks = tasks.len();
    let workers = config.workers.max(1);
    let chunk_size = config.chunk_size(total_tasks);
    info!(
        "Converting {} document(s) to {} with {} worker(s), chunk size {}",
        total_tasks, config.output_type, workers, chunk_size
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total_tasks);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let chunks: Vec<Vec<ConversionTask>> = tasks.chunks(chunk_size).map(<[_]>::to_vec).collect();

    let results: Vec<Vec<TaskResult>> = stream::iter(chunks.into_iter().map(|chunk| {
        let renderer = Arc::clone(&renderer);
        let config = config.clone();
        let stop = Arc::clone(&stop);
        let sources: Vec<PathBuf> = chunk.iter().map(|t| t.source.clone()).collect();
        async move {
            tokio::task::spawn_blocking(move || {
                convert_chunk(&chunk, renderer.as_ref(), &config, &stop)
            })
            .await
            .unwrap_or_else(|e| {
                error!("Worker panicked: {}", e);
                let err = Pdf2ImgError::Internal(format!("Worker panicked: {}", e));
                sources
                    .into_iter()
                    .map(|source| TaskResult::Failed(TaskFailure::new(source, &err)))
                    .collect()
            })
        }
    }))
    .buffer_unordered(workers)
    .collect()
    .await;

    let mut report = RunReport {
        total_tasks,
        workers,
        chunk_size,
        ..Default::default()
    };
    for result in results.into_iter().flatten() {
        match result {
            TaskResult::Done(outcome) => {
                report.succeeded += 1;
                report.pages_written += outcome.pages.len();
            }
            TaskResult::Failed(failure) => {
                report.failed += 1;
                report.failures.push(failure);
            }
            TaskResult::Skipped => report.skipped += 1,
        }
    }
    report.failures.sort_by(|a, b| a.source.cmp(&b.source));
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Run complete: {}/{} documents, {} pages, {} failed, {} skipped, {}ms",
        report.succeeded,
        total_tasks,
        report.pages_written,
        report.failed,
        report.skipped,
        report.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&report);
    }

    report
}

// ── Internal helpers ─────────────────────────────────────────────────────

enum TaskResult {
    Done(TaskOutcome),
    Failed(TaskFailure),
    Skipped,
}

/// Walk the input tree on a blocking thread.
async fn discover_tasks(
    config: &RunConfig,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<ConversionTask>, Pdf2ImgError> {
    let input_dir = input_dir.to_path_buf();
    let output_dir = output_dir.to_path_buf();
    let pattern = config.pattern.clone();
    let suffix = config.output_type.suffix();

    tokio::task::spawn_blocking(move || {
        discover::map_files(&input_dir, &output_dir, &pattern, &suffix)
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Discovery task panicked: {}", e)))?
}

/// Blocking body of one worker: convert `chunk` in order.
fn convert_chunk(
    chunk: &[ConversionTask],
    renderer: &dyn PageRenderer,
    config: &RunConfig,
    stop: &AtomicBool,
) -> Vec<TaskResult> {
    let mut results = Vec::with_capacity(chunk.len());

    for task in chunk {
        if stop.load(Ordering::SeqCst) {
            debug!("Skipping {} after earlier failure", task.source.display());
            results.push(TaskResult::Skipped);
            continue;
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_task_start(&task.source);
        }

        match pages::convert_task(task, renderer, config) {
            Ok(outcome) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_task_complete(&outcome.source, &outcome.pages);
                }
                results.push(TaskResult::Done(outcome));
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", task.source.display(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_task_error(&task.source, &e.to_string());
                }
                if config.failure_policy == FailurePolicy::FailFast {
                    stop.store(true, Ordering::SeqCst);
                }
                results.push(TaskResult::Failed(TaskFailure::new(&task.source, &e)));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputType;
    use crate::error::ErrorKind;
    use image::{DynamicImage, RgbaImage};
    use std::sync::atomic::AtomicUsize;

    /// Renders two blank pages for any input.
    struct TwoPages;

    impl PageRenderer for TwoPages {
        fn render_pages(&self, _pdf_path: &Path) -> Result<Vec<DynamicImage>, Pdf2ImgError> {
            Ok(vec![
                DynamicImage::ImageRgba8(RgbaImage::new(2, 2)),
                DynamicImage::ImageRgba8(RgbaImage::new(2, 2)),
            ])
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl PageRenderer for Counting {
        fn render_pages(&self, _pdf_path: &Path) -> Result<Vec<DynamicImage>, Pdf2ImgError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![DynamicImage::ImageRgba8(RgbaImage::new(1, 1))])
        }
    }

    fn tasks_in(dir: &Path, names: &[&str]) -> Vec<ConversionTask> {
        names
            .iter()
            .map(|n| {
                let source = dir.join(format!("{n}.pdf"));
                std::fs::write(&source, b"%PDF-1.4\n").unwrap();
                ConversionTask {
                    source,
                    destination: dir.join("out").join(format!("{n}.png")),
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn every_task_runs_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = tasks_in(dir.path(), &["a", "b", "c", "d", "e"]);
        let config = RunConfig::builder()
            .output_type(OutputType::Png)
            .workers(2)
            .build()
            .unwrap();
        let renderer = Arc::new(Counting::default());

        let report = run_tasks(tasks, &config, renderer.clone()).await;

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 5);
        assert_eq!(report.total_tasks, 5);
        assert_eq!(report.succeeded, 5);
        assert_eq!(report.pages_written, 5);
        assert_eq!(report.chunk_size, 2);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn best_effort_converts_siblings_of_a_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = tasks_in(dir.path(), &["a", "c"]);
        let bad = dir.path().join("b.pdf");
        std::fs::write(&bad, b"garbage").unwrap();
        tasks.insert(
            1,
            ConversionTask {
                source: bad.clone(),
                destination: dir.path().join("out/b.png"),
            },
        );
        let config = RunConfig::builder()
            .output_type(OutputType::Png)
            .workers(1)
            .build()
            .unwrap();

        let report = run_tasks(tasks, &config, Arc::new(TwoPages)).await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.pages_written, 4);
        assert_eq!(report.failures[0].source, bad);
        assert_eq!(report.failures[0].kind, ErrorKind::Rendering);
        assert!(dir.path().join("out/page-002-c.png").exists());
    }

    #[tokio::test]
    async fn fail_fast_skips_tasks_not_yet_started() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("0-bad.pdf");
        std::fs::write(&bad, b"garbage").unwrap();
        let mut tasks = vec![ConversionTask {
            source: bad,
            destination: dir.path().join("out/0-bad.png"),
        }];
        tasks.extend(tasks_in(dir.path(), &["a", "b", "c"]));
        // One worker, one chunk: strictly sequential.
        let config = RunConfig::builder()
            .output_type(OutputType::Png)
            .workers(1)
            .failure_policy(FailurePolicy::FailFast)
            .build()
            .unwrap();

        let report = run_tasks(tasks, &config, Arc::new(TwoPages)).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.succeeded, 0);
        assert!(!dir.path().join("out/page-001-a.png").exists());
        assert!(report.into_result().is_err());
    }

    #[tokio::test]
    async fn empty_task_list_is_a_clean_run() {
        let report = run_tasks(Vec::new(), &RunConfig::default(), Arc::new(TwoPages)).await;
        assert_eq!(report.total_tasks, 0);
        assert_eq!(report.pages_written, 0);
        assert!(report.failures.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn missing_input_dir_fails_before_any_work() {
        let renderer = Arc::new(Counting::default());
        let err = run_with_renderer(
            &RunConfig::default(),
            "/definitely/not/here",
            "/tmp/out",
            renderer.clone(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::InputDirNotFound { .. }));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }
}
