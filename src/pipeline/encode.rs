//! Image encoding: `DynamicImage` → PNG or JPEG bytes.
//!
//! pdfium hands back RGBA bitmaps. PNG keeps them as they are; JPEG has no
//! alpha channel, so pages are flattened to RGB first.

use crate::config::OutputType;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page in the given output format.
///
/// `jpeg_quality` (1–100) only applies to JPEG output.
pub fn encode_page(
    img: &DynamicImage,
    output_type: OutputType,
    jpeg_quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    match output_type {
        OutputType::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
        OutputType::Jpg | OutputType::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
            rgb.write_with_encoder(encoder)?;
        }
    }

    debug!("Encoded {} page → {} bytes", output_type, buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn png_bytes_decode_back() {
        let data = encode_page(&red_square(), OutputType::Png, 75).expect("encode");
        assert_eq!(
            image::guess_format(&data).unwrap(),
            image::ImageFormat::Png
        );
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn jpeg_drops_alpha() {
        let data = encode_page(&red_square(), OutputType::Jpg, 90).expect("encode");
        assert_eq!(
            image::guess_format(&data).unwrap(),
            image::ImageFormat::Jpeg
        );
        let decoded = image::load_from_memory(&data).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn jpeg_quality_changes_size() {
        let noisy = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8, 255])
        }));
        let low = encode_page(&noisy, OutputType::Jpeg, 10).unwrap();
        let high = encode_page(&noisy, OutputType::Jpeg, 100).unwrap();
        assert!(low.len() < high.len());
    }
}
