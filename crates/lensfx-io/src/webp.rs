//! WebP format support via the `image` crate.
//!
//! The `image` encoder only does lossless WebP, so that is what gets
//! written.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::{ImageData, IoError, IoResult};

/// Reads a WebP file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let img = ImageReader::with_format(BufReader::new(file), ImageFormat::WebP)
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    Ok(dynamic_to_image_data(img))
}

/// Writes an image as lossless WebP.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let dyn_img = image_data_to_dynamic(image)?;
    let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut writer);
    dyn_img
        .write_with_encoder(encoder)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

fn dynamic_to_image_data(img: DynamicImage) -> ImageData {
    let (width, height) = (img.width(), img.height());
    match img {
        DynamicImage::ImageRgb8(rgb) => ImageData::from_u8(width, height, 3, rgb.into_raw()),
        DynamicImage::ImageLuma8(gray) => ImageData::from_u8(width, height, 1, gray.into_raw()),
        DynamicImage::ImageLumaA8(ga) => ImageData::from_u8(width, height, 2, ga.into_raw()),
        other => ImageData::from_u8(width, height, 4, other.to_rgba8().into_raw()),
    }
}

fn image_data_to_dynamic(image: &ImageData) -> IoResult<DynamicImage> {
    let data = image.to_u8();
    let (w, h) = (image.width, image.height);
    let mismatch = || IoError::EncodeError("buffer does not match image dimensions".into());

    // WebP stores RGB or RGBA only
    let img: DynamicImage = match image.channels {
        1 => DynamicImage::ImageLuma8(image::GrayImage::from_raw(w, h, data).ok_or_else(mismatch)?)
            .to_rgb8()
            .into(),
        2 => DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_raw(w, h, data).ok_or_else(mismatch)?)
            .to_rgba8()
            .into(),
        3 => DynamicImage::ImageRgb8(image::RgbImage::from_raw(w, h, data).ok_or_else(mismatch)?),
        4 => DynamicImage::ImageRgba8(image::RgbaImage::from_raw(w, h, data).ok_or_else(mismatch)?),
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webp_roundtrip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.webp");
        let data: Vec<u8> = (0..24 * 24 * 3).map(|i| (i % 256) as u8).collect();
        let image = ImageData::from_u8(24, 24, 3, data.clone());

        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();

        assert_eq!((loaded.width, loaded.height), (24, 24));
        let rgb: Vec<u8> = match loaded.channels {
            3 => loaded.to_u8(),
            _ => loaded.to_u8().chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
        };
        assert_eq!(rgb, data);
    }
}
