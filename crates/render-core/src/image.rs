//! Raster image loading.
//!
//! JPEG streams are embedded untouched (only their dimensions are read);
//! every other supported format is decoded to 8-bit RGB samples.

use crate::types::{ImageData, RasterImage};
use folio_traits::ResourceError;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage, ResourceError> {
    let format = image::guess_format(bytes)
        .map_err(|e| ResourceError::InvalidFormat(format!("Unrecognized image data: {}", e)))?;

    if format == ImageFormat::Jpeg {
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| ResourceError::InvalidFormat(format!("Bad JPEG header: {}", e)))?;
        return Ok(RasterImage {
            width,
            height,
            data: ImageData::Jpeg(bytes.to_vec()),
        });
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ResourceError::InvalidFormat(format!("Failed to decode {:?}: {}", format, e)))?;
    let rgb = decoded.to_rgb8();
    Ok(RasterImage {
        width: rgb.width(),
        height: rgb.height(),
        data: ImageData::Rgb(rgb.into_raw()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(format: ImageFormat) -> Vec<u8> {
        let mut pixels = RgbImage::new(3, 2);
        pixels.put_pixel(0, 0, Rgb([255, 0, 0]));
        pixels.put_pixel(2, 1, Rgb([0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        pixels.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_is_decoded_to_rgb() {
        let image = decode_raster(&encode(ImageFormat::Png)).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        match image.data {
            ImageData::Rgb(samples) => {
                assert_eq!(samples.len(), 3 * 2 * 3);
                assert_eq!(&samples[..3], &[255, 0, 0]);
            }
            other => panic!("expected RGB samples, got {:?}", other),
        }
    }

    #[test]
    fn jpeg_is_passed_through() {
        let bytes = encode(ImageFormat::Jpeg);
        let image = decode_raster(&bytes).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.data, ImageData::Jpeg(bytes));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode_raster(b"definitely not an image"),
            Err(ResourceError::InvalidFormat(_))
        ));
    }
}
