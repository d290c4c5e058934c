//! File discovery: turn an input tree and a glob into conversion tasks.
//!
//! The whole tree is walked and every task built before the first page is
//! rendered, so the driver knows the task count (and therefore the chunk size)
//! up front. Tasks are sorted by source path; the order carries no meaning
//! beyond making runs reproducible.

use crate::error::Pdf2ImgError;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One input PDF and the path its pages are named after.
///
/// `destination` already carries the output extension but no page index;
/// see [`crate::pipeline::pages::page_output_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Compile `pattern` the way shell globs behave: `*` and `?` stay inside one
/// path component, `**/` spans zero or more directories.
///
/// Returns `None` for a pattern that does not compile.
pub fn compile_pattern(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!("Glob '{}' is invalid and matches nothing: {}", pattern, e);
            None
        }
    }
}

/// Enumerate files under `input_root` matching `pattern` and map each one to
/// its destination under `output_root`.
///
/// The destination keeps the match's path relative to `input_root` and swaps
/// its extension for `suffix` (with or without the leading dot).
///
/// # Errors
/// [`Pdf2ImgError::InputDirNotFound`] when `input_root` is not a directory.
/// Unreadable entries below the root are logged and skipped.
pub fn map_files(
    input_root: &Path,
    output_root: &Path,
    pattern: &str,
    suffix: &str,
) -> Result<Vec<ConversionTask>, Pdf2ImgError> {
    if !input_root.is_dir() {
        return Err(Pdf2ImgError::InputDirNotFound {
            path: input_root.to_path_buf(),
        });
    }

    let Some(matcher) = compile_pattern(pattern) else {
        return Ok(Vec::new());
    };
    let extension = suffix.trim_start_matches('.');

    let mut tasks = Vec::new();
    for entry in WalkDir::new(input_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", input_root.display(), e);
                continue;
            }
        };
        // Follows file symlinks, like a shell glob does.
        if !entry.path().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(input_root) else {
            continue;
        };
        if !matcher.is_match(rel) {
            continue;
        }

        let destination = output_root.join(rel).with_extension(extension);
        debug!("{} → {}", entry.path().display(), destination.display());
        tasks.push(ConversionTask {
            source: entry.path().to_path_buf(),
            destination,
        });
    }

    tasks.sort_by(|a, b| a.source.cmp(&b.source));
    info!(
        "Matched {} file(s) under {} with '{}'",
        tasks.len(),
        input_root.display(),
        pattern
    );
    Ok(tasks)
}
