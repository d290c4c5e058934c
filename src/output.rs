//! Result types produced by a run.

use crate::error::{Pdf2ImgError, TaskFailure};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A successfully converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// The input PDF.
    pub source: PathBuf,
    /// Page files written, in page order.
    pub pages: Vec<PathBuf>,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Documents matched by the pattern.
    pub total_tasks: usize,
    /// Documents whose every page was written.
    pub succeeded: usize,
    /// Documents that failed.
    pub failed: usize,
    /// Documents never started (fail-fast only).
    pub skipped: usize,
    /// Page files written by the documents that succeeded.
    pub pages_written: usize,
    /// Concurrent chunks allowed.
    pub workers: usize,
    /// Tasks per chunk.
    pub chunk_size: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// One entry per failed document, sorted by source path.
    pub failures: Vec<TaskFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// Turn a report with failures into [`Pdf2ImgError::TasksFailed`].
    pub fn into_result(self) -> Result<RunReport, Pdf2ImgError> {
        if self.failed == 0 {
            return Ok(self);
        }
        let first_error = self
            .failures
            .first()
            .map(|f| format!("{}: {}", f.source.display(), f.message))
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(Pdf2ImgError::TasksFailed {
            failed: self.failed,
            total: self.total_tasks,
            first_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn clean_report_is_ok() {
        let report = RunReport {
            total_tasks: 2,
            succeeded: 2,
            pages_written: 5,
            ..Default::default()
        };
        assert!(report.is_success());
        assert_eq!(report.clone().into_result().unwrap(), report);
    }

    #[test]
    fn failures_become_tasks_failed() {
        let report = RunReport {
            total_tasks: 3,
            succeeded: 2,
            failed: 1,
            failures: vec![TaskFailure {
                source: "in/bad.pdf".into(),
                kind: ErrorKind::Rendering,
                message: "File is not a valid PDF".into(),
            }],
            ..Default::default()
        };
        assert!(!report.is_success());
        match report.into_result() {
            Err(Pdf2ImgError::TasksFailed {
                failed,
                total,
                first_error,
            }) => {
                assert_eq!((failed, total), (1, 3));
                assert!(first_error.contains("bad.pdf"));
            }
            other => panic!("expected TasksFailed, got {other:?}"),
        }
    }

    #[test]
    fn report_serialises_to_json() {
        let report = RunReport {
            total_tasks: 1,
            succeeded: 1,
            pages_written: 3,
            workers: 4,
            chunk_size: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pages_written"], 3);
        assert_eq!(json["failures"], serde_json::json!([]));
    }
}
