//! PDF rasterisation: render every page of a document to a `DynamicImage`.
//!
//! Rendering sits behind the [`PageRenderer`] trait so the rest of the
//! pipeline never names pdfium directly; [`PdfiumRenderer`] is the production
//! implementation and tests plug in synthetic renderers.
//!
//! All methods are blocking. The driver calls them from
//! `tokio::task::spawn_blocking` workers; `pdfium-render`'s `thread_safe`
//! feature serialises the underlying FFI calls.

use crate::error::Pdf2ImgError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders the pages of a PDF in document order.
pub trait PageRenderer: Send + Sync {
    /// Render every page of `pdf_path`, page 1 first.
    ///
    /// # Errors
    /// A rendering-class [`Pdf2ImgError`] when the document cannot be opened
    /// or any page fails to rasterise.
    fn render_pages(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, Pdf2ImgError>;
}

/// Bind to pdfium: an explicit library path if given, else the system library.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, Pdf2ImgError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    };
    bindings
        .map(Pdfium::new)
        .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// [`PageRenderer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    library: Option<PathBuf>,
    dpi: u32,
    max_pixels: Option<u32>,
}

impl PdfiumRenderer {
    pub fn new(library: Option<PathBuf>, dpi: u32, max_pixels: Option<u32>) -> Self {
        Self {
            library,
            dpi,
            max_pixels,
        }
    }

    /// Fail early with [`Pdf2ImgError::PdfiumBindingFailed`] if the library
    /// cannot be loaded, before any task has started.
    pub fn probe(&self) -> Result<(), Pdf2ImgError> {
        bind_pdfium(self.library.as_deref()).map(|_| ())
    }

    fn render_config(&self) -> PdfRenderConfig {
        let config = PdfRenderConfig::new().scale_page_by_factor(self.dpi as f32 / 72.0);
        match self.max_pixels {
            Some(px) => config
                .set_maximum_width(px as i32)
                .set_maximum_height(px as i32),
            None => config,
        }
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, Pdf2ImgError> {
        let pdfium = bind_pdfium(self.library.as_deref())?;

        let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                Pdf2ImgError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2ImgError::CorruptPdf {
                    path: pdf_path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("{}: {} pages", pdf_path.display(), total_pages);

        let render_config = self.render_config();
        let mut images = Vec::with_capacity(total_pages);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                Pdf2ImgError::RasterisationFailed {
                    path: pdf_path.to_path_buf(),
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}
