//! TIFF format support.
//!
//! Reads 8 and 16-bit gray/RGB/RGBA and 32-bit float RGB(A). Writes 8-bit
//! RGB or RGBA with LZW compression, the ARGB8 layout the demo exports use.
//!
//! # Example
//!
//! ```rust,ignore
//! use lensfx_io::tiff;
//!
//! let image = tiff::read("scan.tiff")?;
//! tiff::write("output.tiff", &image)?;
//! ```

use crate::{ImageData, IoError, IoResult, Metadata, PixelData, PixelFormat};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

fn decode_err(e: tiff::TiffError) -> IoError {
    IoError::DecodeError(e.to_string())
}

fn encode_err(e: tiff::TiffError) -> IoError {
    IoError::EncodeError(e.to_string())
}

/// Reads a TIFF file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    read_from(BufReader::new(file))
}

/// Reads a TIFF stream.
pub fn read_from<R: Read + Seek>(reader: R) -> IoResult<ImageData> {
    use tiff::decoder::{Decoder, DecodingResult};
    use tiff::ColorType;

    let mut decoder = Decoder::new(reader).map_err(decode_err)?;
    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let color_type = decoder.colortype().map_err(decode_err)?;
    let result = decoder.read_image().map_err(decode_err)?;

    let channels = match color_type {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!("TIFF color type {:?}", other)));
        }
    };

    let (format, data, depth) = match result {
        DecodingResult::U8(buf) => (PixelFormat::U8, PixelData::U8(buf), 8),
        DecodingResult::U16(buf) => (PixelFormat::U16, PixelData::U16(buf), 16),
        DecodingResult::F32(buf) => (PixelFormat::F32, PixelData::F32(buf), 32),
        _ => {
            return Err(IoError::UnsupportedBitDepth(format!("TIFF samples for {:?}", color_type)));
        }
    };

    Ok(ImageData { width, height, channels, format, data, metadata: Metadata::srgb(depth) })
}

/// Writes an image as 8-bit LZW TIFF.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

/// Encodes an image as 8-bit LZW TIFF into a seekable writer.
pub fn write_to<W: Write + Seek>(writer: W, image: &ImageData) -> IoResult<()> {
    use tiff::encoder::{colortype, compression, TiffEncoder};

    let mut encoder = TiffEncoder::new(writer).map_err(encode_err)?;
    let data = image.to_u8();
    let (width, height) = (image.width, image.height);

    match image.channels {
        1 => encoder
            .write_image_with_compression::<colortype::Gray8, _>(width, height, compression::Lzw, &data)
            .map_err(encode_err)?,
        // Gray+alpha is widened to RGBA
        2 => {
            let rgba: Vec<u8> = data.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect();
            encoder
                .write_image_with_compression::<colortype::RGBA8, _>(width, height, compression::Lzw, &rgba)
                .map_err(encode_err)?
        }
        3 => encoder
            .write_image_with_compression::<colortype::RGB8, _>(width, height, compression::Lzw, &data)
            .map_err(encode_err)?,
        4 => encoder
            .write_image_with_compression::<colortype::RGBA8, _>(width, height, compression::Lzw, &data)
            .map_err(encode_err)?,
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_roundtrip_rgb() {
        let (width, height) = (12u32, 6u32);
        let data: Vec<u8> = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        let image = ImageData::from_u8(width, height, 3, data.clone());

        let mut cursor = Cursor::new(Vec::new());
        write_to(&mut cursor, &image).unwrap();
        cursor.set_position(0);
        let loaded = read_from(cursor).unwrap();

        assert_eq!((loaded.width, loaded.height, loaded.channels), (width, height, 3));
        assert_eq!(loaded.format, PixelFormat::U8);
        assert_eq!(loaded.to_u8(), data);
    }

    #[test]
    fn test_float_input_is_written_as_8bit() {
        let image = ImageData::from_f32(2, 2, 4, vec![0.5; 16]);
        let mut cursor = Cursor::new(Vec::new());
        write_to(&mut cursor, &image).unwrap();
        cursor.set_position(0);
        let loaded = read_from(cursor).unwrap();
        assert_eq!(loaded.channels, 4);
        assert_eq!(loaded.to_u8()[0], 128);
    }
}
