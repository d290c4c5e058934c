//! Per-document conversion: render a task's PDF and write one file per page.

use crate::config::RunConfig;
use crate::error::Pdf2ImgError;
use crate::output::TaskOutcome;
use crate::pipeline::discover::ConversionTask;
use crate::pipeline::render::PageRenderer;
use crate::pipeline::{encode, input};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Insert `page-{index:03}-` in front of the file name of `destination`.
///
/// `index` is 1-based; values above 999 widen rather than wrap.
pub fn page_output_path(destination: &Path, index: usize) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("page-{index:03}-{name}");
    match destination.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Convert every page of `task.source` into an image next to `task.destination`.
///
/// Pages already written stay on disk if a later page fails, and existing
/// files are overwritten.
pub fn convert_task(
    task: &ConversionTask,
    renderer: &dyn PageRenderer,
    config: &RunConfig,
) -> Result<TaskOutcome, Pdf2ImgError> {
    input::check_pdf_magic(&task.source)?;

    let images = renderer.render_pages(&task.source)?;
    if images.is_empty() {
        return Err(Pdf2ImgError::EmptyDocument {
            path: task.source.clone(),
        });
    }

    if let Some(parent) = task.destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Pdf2ImgError::OutputWriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut pages = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let path = page_output_path(&task.destination, i + 1);
        let bytes = encode::encode_page(image, config.output_type, config.jpeg_quality).map_err(
            |e| Pdf2ImgError::ImageEncodeFailed {
                path: path.clone(),
                source: e,
            },
        )?;
        std::fs::write(&path, &bytes).map_err(|e| Pdf2ImgError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!("Wrote {}", path.display());
        pages.push(path);
    }

    info!(
        "Converted {} → {} page(s)",
        task.source.display(),
        pages.len()
    );
    Ok(TaskOutcome {
        source: task.source.clone(),
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputType;
    use image::{DynamicImage, Rgba, RgbaImage};

    struct SolidPages(usize);

    impl PageRenderer for SolidPages {
        fn render_pages(&self, _pdf_path: &Path) -> Result<Vec<DynamicImage>, Pdf2ImgError> {
            Ok((0..self.0)
                .map(|i| {
                    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                        4,
                        4,
                        Rgba([i as u8, 0, 0, 255]),
                    ))
                })
                .collect())
        }
    }

    fn pdf_task(dir: &Path, rel_out: &str) -> ConversionTask {
        let source = dir.join("in.pdf");
        std::fs::write(&source, b"%PDF-1.4\n").unwrap();
        ConversionTask {
            source,
            destination: dir.join(rel_out),
        }
    }

    #[test]
    fn page_path_inserts_index_before_file_name() {
        assert_eq!(
            page_output_path(Path::new("/out/doc.png"), 1),
            PathBuf::from("/out/page-001-doc.png")
        );
        assert_eq!(
            page_output_path(Path::new("/out/sub/dir/a.jpg"), 42),
            PathBuf::from("/out/sub/dir/page-042-a.jpg")
        );
        assert_eq!(
            page_output_path(Path::new("a.jpg"), 1000),
            PathBuf::from("page-1000-a.jpg")
        );
    }

    #[test]
    fn writes_one_file_per_page_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let task = pdf_task(dir.path(), "out/nested/doc.png");
        let config = RunConfig::builder()
            .output_type(OutputType::Png)
            .build()
            .unwrap();

        let outcome = convert_task(&task, &SolidPages(3), &config).unwrap();

        let expected: Vec<PathBuf> = (1..=3)
            .map(|i| dir.path().join(format!("out/nested/page-{i:03}-doc.png")))
            .collect();
        assert_eq!(outcome.pages, expected);
        for (i, p) in expected.iter().enumerate() {
            let img = image::open(p).unwrap().to_rgba8();
            assert_eq!(img.get_pixel(0, 0)[0], i as u8);
        }
        assert!(!dir.path().join("out/nested/doc.png").exists());
    }

    #[test]
    fn zero_pages_is_a_rendering_error() {
        let dir = tempfile::tempdir().unwrap();
        let task = pdf_task(dir.path(), "doc.jpg");
        let err = convert_task(&task, &SolidPages(0), &RunConfig::default()).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::EmptyDocument { .. }));
    }

    #[test]
    fn header_after_bom_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        std::fs::write(&source, b"\xEF\xBB\xBF%PDF-1.4\n").unwrap();
        let task = ConversionTask {
            source,
            destination: dir.path().join("out/doc.jpg"),
        };

        let outcome = convert_task(&task, &SolidPages(1), &RunConfig::default()).unwrap();
        assert_eq!(
            outcome.pages,
            vec![dir.path().join("out/page-001-doc.jpg")]
        );
    }

    #[test]
    fn non_pdf_is_rejected_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fake.pdf");
        std::fs::write(&source, b"<html>not found</html>").unwrap();
        let task = ConversionTask {
            source,
            destination: dir.path().join("fake.jpg"),
        };
        let err = convert_task(&task, &SolidPages(1), &RunConfig::default()).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::NotAPdf { .. }));
        assert!(!dir.path().join("page-001-fake.jpg").exists());
    }

    #[test]
    fn existing_outputs_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let task = pdf_task(dir.path(), "doc.jpg");
        let stale = dir.path().join("page-001-doc.jpg");
        std::fs::write(&stale, b"stale").unwrap();

        convert_task(&task, &SolidPages(1), &RunConfig::default()).unwrap();

        let bytes = std::fs::read(&stale).unwrap();
        assert_ne!(bytes, b"stale");
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
