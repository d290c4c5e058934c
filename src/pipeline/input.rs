//! Input validation: reject sources that are not PDFs before pdfium sees them.
//!
//! A glob like `**/*.pdf` happily matches a ZIP or an HTML error page saved
//! with a `.pdf` name. Checking the `%PDF` magic bytes up front turns those
//! into a clear [`Pdf2ImgError::NotAPdf`] instead of an opaque pdfium
//! failure.

use crate::error::Pdf2ImgError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Readers accept the header anywhere in the first 1024 bytes, so a BOM or a
/// mail wrapper in front of it is still a PDF.
const HEADER_WINDOW: u64 = 1024;

/// Check that `path` is readable and has a `%PDF` header in its first
/// [`HEADER_WINDOW`] bytes.
pub fn check_pdf_magic(path: &Path) -> Result<(), Pdf2ImgError> {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2ImgError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2ImgError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut head = Vec::with_capacity(HEADER_WINDOW as usize);
    file.by_ref()
        .take(HEADER_WINDOW)
        .read_to_end(&mut head)
        .map_err(|source| Pdf2ImgError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    if !head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        head.truncate(PDF_MAGIC.len());
        return Err(Pdf2ImgError::NotAPdf {
            path: path.to_path_buf(),
            magic: head,
        });
    }

    debug!("Validated PDF header: {}", path.display());
    Ok(())
}
