//! JPEG format support.
//!
//! Decoding goes through `jpeg-decoder` and always yields 8-bit RGB
//! (gray and CMYK sources are converted). Encoding uses `jpeg-encoder`;
//! alpha is dropped since JPEG cannot carry it.
//!
//! # Example
//!
//! ```rust,ignore
//! use lensfx_io::jpeg;
//!
//! let image = jpeg::read("photo.jpg")?;
//! jpeg::write_with_quality("preview.jpg", &image, 85)?;
//! ```

use crate::{ImageData, IoError, IoResult, Metadata, PixelData, PixelFormat};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default encoder quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    read_from(file)
}

/// Reads a JPEG stream.
pub fn read_from<R: Read>(reader: R) -> IoResult<ImageData> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(reader));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| [l16[0], l16[0], l16[0]])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels.chunks_exact(4).flat_map(cmyk_to_rgb).collect(),
    };

    Ok(ImageData {
        width: info.width as u32,
        height: info.height as u32,
        channels: 3,
        format: PixelFormat::U8,
        data: PixelData::U8(rgb),
        metadata: Metadata::srgb(8),
    })
}

/// Naive CMYK to RGB.
fn cmyk_to_rgb(cmyk: &[u8]) -> [u8; 3] {
    let k = 1.0 - cmyk[3] as f32 / 255.0;
    let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0).round() as u8;
    [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
}

/// Writes an image as JPEG with [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

/// Writes an image as JPEG with the given quality (clamped to 1-100).
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &ImageData, quality: u8) -> IoResult<()> {
    let bytes = encode(image, quality)?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Encodes an image to JPEG bytes.
pub fn encode(image: &ImageData, quality: u8) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let (width, height) = match (u16::try_from(image.width), u16::try_from(image.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(IoError::TooLarge { width: image.width, height: image.height, format: "jpeg" });
        }
    };

    let u8_data = image.to_u8();
    let rgb: Vec<u8> = match image.channels {
        3 => u8_data,
        4 => u8_data.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
        1 => u8_data.iter().flat_map(|&g| [g, g, g]).collect(),
        2 => u8_data.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0]]).collect(),
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode(&rgb, width, height, ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_flat_color_survives_encoding() {
        let image = ImageData::from_u8(32, 32, 4, [200u8, 100, 50, 255].repeat(32 * 32));
        let bytes = encode(&image, 95).unwrap();
        let loaded = read_from(Cursor::new(bytes)).unwrap();

        assert_eq!((loaded.width, loaded.height, loaded.channels), (32, 32, 3));
        let px = &loaded.to_u8()[..3];
        assert!((px[0] as i32 - 200).abs() <= 3);
        assert!((px[1] as i32 - 100).abs() <= 3);
        assert!((px[2] as i32 - 50).abs() <= 3);
    }

    #[test]
    fn test_too_large() {
        let image = ImageData::from_u8(70000, 1, 1, vec![0; 70000]);
        assert!(matches!(encode(&image, 90), Err(IoError::TooLarge { .. })));
    }

    #[test]
    fn test_cmyk_white() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
    }
}
