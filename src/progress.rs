//! Progress-callback trait for per-task run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to receive events
//! as the driver converts each document. The CLI forwards them to a terminal
//! progress bar; library callers can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{RunConfig, RunProgressCallback};
//! use std::path::{Path, PathBuf};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for PageCounter {
//!     fn on_task_complete(&self, _source: &Path, pages: &[PathBuf]) {
//!         self.pages.fetch_add(pages.len(), Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = RunConfig::builder()
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RunReport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Called by the driver as it processes each task.
///
/// Implementations must be `Send + Sync`: task events arrive concurrently
/// from every worker, in completion order. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after discovery, before any task starts.
    fn on_run_start(&self, total_tasks: usize) {
        let _ = total_tasks;
    }

    /// Called just before a document is rendered.
    fn on_task_start(&self, source: &Path) {
        let _ = source;
    }

    /// Called when every page of a document has been written.
    ///
    /// # Arguments
    /// * `source`: the input PDF
    /// * `pages`: written page files, in page order
    fn on_task_complete(&self, source: &Path, pages: &[PathBuf]) {
        let _ = (source, pages);
    }

    /// Called when a document fails.
    fn on_task_error(&self, source: &Path, error: &str) {
        let _ = (source, error);
    }

    /// Called once after all tasks have been attempted or skipped.
    fn on_run_complete(&self, report: &RunReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        pages: AtomicUsize,
        errors: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_run_start(&self, total_tasks: usize) {
            self.started_total.store(total_tasks, Ordering::SeqCst);
        }

        fn on_task_start(&self, _source: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_task_complete(&self, _source: &Path, pages: &[PathBuf]) {
            self.pages.fetch_add(pages.len(), Ordering::SeqCst);
        }

        fn on_task_error(&self, _source: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_task_start(Path::new("a.pdf"));
        cb.on_task_complete(Path::new("a.pdf"), &[PathBuf::from("page-001-a.jpg")]);
        cb.on_task_error(Path::new("b.pdf"), "corrupt");
        cb.on_run_complete(&RunReport::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_run_start(2);
        tracker.on_task_start(Path::new("a.pdf"));
        tracker.on_task_complete(
            Path::new("a.pdf"),
            &[PathBuf::from("page-001-a.png"), PathBuf::from("page-002-a.png")],
        );
        tracker.on_task_start(Path::new("b.pdf"));
        tracker.on_task_error(Path::new("b.pdf"), "not a PDF");

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }
}
