//! # lensfx-io
//!
//! Image file reading and writing for lensfx.
//!
//! - **PNG** - 8/16-bit, gray, RGB and RGBA; written as 8-bit with an sRGB chunk
//! - **JPEG** - read RGB/gray/CMYK, write 8-bit RGB with a quality setting
//! - **TIFF** - read 8/16/32-bit, write 8-bit RGB(A) with LZW
//! - **WebP** - lossless, via the `image` crate
//!
//! Samples are treated as sRGB-encoded throughout: decoding normalizes them
//! to `[0, 1]` and encoding clamps and quantizes them back, with no transfer
//! function applied in either direction. Files are tagged sRGB where the
//! format has a way to say so.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lensfx_io::{read_image, write_image};
//!
//! let img = read_image("photo.jpg")?;
//! write_image("copy.png", &img)?;
//! ```
//!
//! # Feature Flags
//!
//! - `png`, `jpeg`, `tiff`, `webp` - all on by default

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "tiff")]
pub mod tiff;

#[cfg(feature = "webp")]
pub mod webp;

pub use detect::Format;
pub use error::{IoError, IoResult};

use lensfx_core::Image;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Name recorded in [`Metadata::colorspace`] for everything lensfx touches.
pub const SRGB: &str = "sRGB";

/// Reads an image file, detecting the format from magic bytes and extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    trace!(path = %path.display(), %format, "read");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),
        #[cfg(feature = "tiff")]
        Format::Tiff => tiff::read(path),
        #[cfg(feature = "webp")]
        Format::WebP => webp::read(path),
        Format::Unknown => Err(unsupported(path)),
        #[allow(unreachable_patterns)]
        other => Err(IoError::FeatureDisabled(other.name())),
    }
}

/// Writes an image file, choosing the format from the extension.
///
/// Extensions other than png, jpg/jpeg, tif/tiff and webp are an
/// [`IoError::UnsupportedFormat`] error; nothing is written.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    write_with_options(path, image, &WriteOptions::default())
}

/// Options that apply when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// [`write`] with explicit options.
#[cfg_attr(not(feature = "jpeg"), allow(unused_variables))]
pub fn write_with_options<P: AsRef<Path>>(
    path: P,
    image: &ImageData,
    options: &WriteOptions,
) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    trace!(path = %path.display(), %format, "write");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write_with_quality(path, image, options.jpeg_quality),
        #[cfg(feature = "tiff")]
        Format::Tiff => tiff::write(path, image),
        #[cfg(feature = "webp")]
        Format::WebP => webp::write(path, image),
        Format::Unknown => Err(unsupported(path)),
        #[allow(unreachable_patterns)]
        other => Err(IoError::FeatureDisabled(other.name())),
    }
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Reads a file straight into an [`Image`].
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    read(path)?.to_image()
}

/// Reads `name` resolved against `base_dir`.
///
/// Absolute names are used as given. This is the path the demo recipes use
/// to find inputs stored next to the recipe file.
pub fn read_image_relative<B: AsRef<Path>, N: AsRef<Path>>(base_dir: B, name: N) -> IoResult<Image> {
    read_image(resolve_relative(base_dir, name))
}

/// Joins `name` onto `base_dir` unless it is already absolute.
pub fn resolve_relative<B: AsRef<Path>, N: AsRef<Path>>(base_dir: B, name: N) -> PathBuf {
    let name = name.as_ref();
    if name.is_absolute() {
        name.to_path_buf()
    } else {
        base_dir.as_ref().join(name)
    }
}

/// Writes an [`Image`] tagged as sRGB.
pub fn write_image<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    write(path, &ImageData::from_image(image))
}

/// [`write_image`] with explicit options.
pub fn write_image_with_options<P: AsRef<Path>>(
    path: P,
    image: &Image,
    options: &WriteOptions,
) -> IoResult<()> {
    write_with_options(path, &ImageData::from_image(image), options)
}

/// Format-agnostic pixel container used at the codec boundary.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of interleaved channels (1 to 4).
    pub channels: u32,
    /// Sample type.
    pub format: PixelFormat,
    /// Raw samples.
    pub data: PixelData,
    /// File metadata.
    pub metadata: Metadata,
}

/// Sample type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit unsigned integer per channel.
    U8,
    /// 16-bit unsigned integer per channel.
    U16,
    /// 32-bit float per channel.
    F32,
}

/// Raw sample storage.
#[derive(Debug, Clone)]
pub enum PixelData {
    /// 8-bit unsigned data.
    U8(Vec<u8>),
    /// 16-bit unsigned data.
    U16(Vec<u16>),
    /// 32-bit float data.
    F32(Vec<f32>),
}

/// Image metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Color space name.
    pub colorspace: Option<String>,
    /// Bits per sample in the source file.
    pub bit_depth: Option<u8>,
    /// DPI if the file stores it.
    pub dpi: Option<f32>,
}

impl Metadata {
    /// Metadata for an sRGB image of the given bit depth.
    pub fn srgb(bit_depth: u8) -> Self {
        Self { colorspace: Some(SRGB.to_string()), bit_depth: Some(bit_depth), dpi: None }
    }
}

impl ImageData {
    /// Creates ImageData from f32 samples.
    pub fn from_f32(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            channels,
            format: PixelFormat::F32,
            data: PixelData::F32(data),
            metadata: Metadata::srgb(32),
        }
    }

    /// Creates ImageData from u8 samples.
    pub fn from_u8(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            format: PixelFormat::U8,
            data: PixelData::U8(data),
            metadata: Metadata::srgb(8),
        }
    }

    /// Creates ImageData from u16 samples.
    pub fn from_u16(width: u32, height: u32, channels: u32, data: Vec<u16>) -> Self {
        Self {
            width,
            height,
            channels,
            format: PixelFormat::U16,
            data: PixelData::U16(data),
            metadata: Metadata::srgb(16),
        }
    }

    /// Wraps a processing [`Image`].
    pub fn from_image(image: &Image) -> Self {
        Self::from_f32(image.width(), image.height(), image.channels(), image.data().to_vec())
    }

    /// Total number of samples (pixels * channels).
    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Samples normalized to f32.
    pub fn to_f32(&self) -> Vec<f32> {
        match &self.data {
            PixelData::U8(data) => data.iter().map(|&v| v as f32 / 255.0).collect(),
            PixelData::U16(data) => data.iter().map(|&v| v as f32 / 65535.0).collect(),
            PixelData::F32(data) => data.clone(),
        }
    }

    /// Samples quantized to u8, clamped and rounded.
    pub fn to_u8(&self) -> Vec<u8> {
        match &self.data {
            PixelData::U8(data) => data.clone(),
            PixelData::U16(data) => data
                .iter()
                .map(|&v| ((v as u32 * 255 + 32767) / 65535) as u8)
                .collect(),
            PixelData::F32(data) => data.iter().map(|&v| quantize_u8(v)).collect(),
        }
    }

    /// Converts to a processing [`Image`].
    pub fn to_image(&self) -> IoResult<Image> {
        Ok(Image::from_data(self.width, self.height, self.channels, self.to_f32())?)
    }
}

/// Clamps to `[0, 1]` and rounds to the nearest 8-bit code. NaN maps to 0.
#[inline]
pub fn quantize_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(quantize_u8(-1.0), 0);
        assert_eq!(quantize_u8(2.0), 255);
        assert_eq!(quantize_u8(0.5), 128);
        assert_eq!(quantize_u8(f32::NAN), 0);
    }

    #[test]
    fn test_u16_to_u8() {
        let data = ImageData::from_u16(1, 1, 3, vec![0, 32896, 65535]);
        assert_eq!(data.to_u8(), vec![0, 128, 255]);
    }

    #[test]
    fn test_image_conversion() {
        let img = Image::filled(2, 3, &[0.25, 0.5, 0.75]).unwrap();
        let data = ImageData::from_image(&img);
        assert_eq!(data.sample_count(), 18);
        assert_eq!(data.metadata.colorspace.as_deref(), Some(SRGB));
        assert_eq!(data.to_image().unwrap(), img);
    }

    #[test]
    fn test_bad_buffer_is_error() {
        let data = ImageData::from_u8(2, 2, 3, vec![0; 5]);
        assert!(matches!(data.to_image(), Err(IoError::Image(_))));
    }

    #[test]
    fn test_resolve_relative() {
        let p = resolve_relative("/data/recipes", "lens.png");
        assert_eq!(p, PathBuf::from("/data/recipes/lens.png"));
        let abs = resolve_relative("/data", "/tmp/x.png");
        assert_eq!(abs, PathBuf::from("/tmp/x.png"));
    }

    #[test]
    fn test_write_unknown_extension() {
        let data = ImageData::from_u8(1, 1, 3, vec![0; 3]);
        let err = write("out.bmp", &data).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(ext) if ext == "bmp"));
    }
}
