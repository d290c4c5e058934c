//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the rendering backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ input ──▶ render ──▶ encode ──▶ pages
//!  (glob)      (%PDF)    (pdfium)  (png/jpeg)  (page-NNN-*)
//! ```
//!
//! 1. [`discover`]: walk the input tree and build one task per matching file
//! 2. [`input`]:    reject sources without a PDF header
//! 3. [`render`]:   rasterise every page behind the [`render::PageRenderer`] trait
//! 4. [`encode`]:   encode each page in the requested format
//! 5. [`pages`]:    name and write the page files for one task

pub mod discover;
pub mod encode;
pub mod input;
pub mod pages;
pub mod render;
