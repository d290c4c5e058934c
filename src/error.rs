//! Error types for the pdf2img library.
//!
//! Two distinct shapes reflect two distinct failure modes:
//!
//! * [`Pdf2ImgError`]: returned as `Err(..)` whenever an operation cannot
//!   complete, e.g. an unknown output type or a PDF that will not render.
//!
//! * [`TaskFailure`]: the serialisable record of one failed
//!   [`crate::pipeline::discover::ConversionTask`]. The driver stores these in
//!   [`crate::output::RunReport`] so a single broken document does not hide
//!   what happened to its siblings.
//!
//! Every [`Pdf2ImgError`] variant belongs to exactly one [`ErrorKind`]; the
//! kind is what ends up in the report and what tests assert against.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Option validation failed (unknown output type, zero workers, …).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input root does not exist or is not a directory.
    #[error("Input directory not found: '{path}'")]
    InputDirNotFound { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium on the library search path, or point\n\
PDFIUM_LIB_PATH (--pdfium-lib) at an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// A task's source file vanished between discovery and conversion.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file was opened but reading its header failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; pdf2img never supplies a password.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// The document parsed but contains no pages.
    #[error("PDF '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for '{path}' page {page}: {detail}")]
    RasterisationFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The page image could not be encoded in the requested format.
    #[error("Failed to encode image '{path}': {source}")]
    ImageEncodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not create an output directory or write a page file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Run errors ────────────────────────────────────────────────────────
    /// At least one task failed.
    ///
    /// Returned by [`crate::output::RunReport::into_result`] when the caller
    /// wants to treat any task failure as an error.
    #[error("{failed}/{total} documents failed to convert\nFirst failure: {first_error}")]
    TasksFailed {
        failed: usize,
        total: usize,
        first_error: String,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (runtime creation, panicked worker).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error class used in reports and exit-status decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad options or environment; detected before any task runs.
    Configuration,
    /// A source document could not be rasterised.
    Rendering,
    /// Reading the source or writing an output failed.
    Io,
    /// Anything else.
    Internal,
}

impl Pdf2ImgError {
    /// The class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2ImgError::InvalidConfig(_)
            | Pdf2ImgError::InputDirNotFound { .. }
            | Pdf2ImgError::PdfiumBindingFailed(_) => ErrorKind::Configuration,
            Pdf2ImgError::NotAPdf { .. }
            | Pdf2ImgError::CorruptPdf { .. }
            | Pdf2ImgError::PasswordRequired { .. }
            | Pdf2ImgError::EmptyDocument { .. }
            | Pdf2ImgError::RasterisationFailed { .. } => ErrorKind::Rendering,
            Pdf2ImgError::FileNotFound { .. }
            | Pdf2ImgError::PermissionDenied { .. }
            | Pdf2ImgError::ReadFailed { .. }
            | Pdf2ImgError::ImageEncodeFailed { .. }
            | Pdf2ImgError::OutputWriteFailed { .. } => ErrorKind::Io,
            Pdf2ImgError::TasksFailed { .. } | Pdf2ImgError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A failed task, as recorded in [`crate::output::RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Source PDF of the failed task.
    pub source: PathBuf,
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable error description.
    pub message: String,
}

impl TaskFailure {
    pub fn new(source: impl Into<PathBuf>, err: &Pdf2ImgError) -> Self {
        Self {
            source: source.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
