//! Owned image buffer.
//!
//! [`Image`] stores interleaved `f32` samples in row-major order, top to
//! bottom. Values are display-referred and nominally in `[0, 1]`, but
//! nothing clamps them until an image is encoded.
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//! ```
//!
//! # Usage
//!
//! ```rust
//! use lensfx_core::Image;
//!
//! let mut img = Image::new(4, 4, 4).unwrap();
//! img.set_pixel(1, 2, &[1.0, 0.5, 0.25, 1.0]).unwrap();
//! assert_eq!(img.pixel(1, 2), &[1.0, 0.5, 0.25, 1.0]);
//! ```

use crate::{Error, Rect, Result};

/// Rec.709 luma weights.
pub const REC709_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Rec.709 relative luminance of an RGB triple.
#[inline]
pub fn luminance_rec709(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC709_LUMA[0] + rgb[1] * REC709_LUMA[1] + rgb[2] * REC709_LUMA[2]
}

/// Owned image buffer with 1 to 4 interleaved `f32` channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<f32>,
}

impl Image {
    /// Creates a zero-filled image.
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self> {
        Self::validate(width, height, channels)?;
        let len = width as usize * height as usize * channels as usize;
        Ok(Self { width, height, channels, data: vec![0.0; len] })
    }

    /// Wraps existing sample data.
    ///
    /// ```rust
    /// use lensfx_core::Image;
    ///
    /// let img = Image::from_data(2, 1, 3, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]).unwrap();
    /// assert_eq!(img.pixel(1, 0), &[0.3, 0.4, 0.5]);
    /// assert!(Image::from_data(2, 2, 3, vec![0.0; 5]).is_err());
    /// ```
    pub fn from_data(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Result<Self> {
        Self::validate(width, height, channels)?;
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Creates an image where every pixel equals `value`.
    ///
    /// The channel count is `value.len()`.
    pub fn filled(width: u32, height: u32, value: &[f32]) -> Result<Self> {
        let channels = value.len() as u32;
        Self::validate(width, height, channels)?;
        let data = value
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * value.len())
            .collect();
        Ok(Self { width, height, channels, data })
    }

    fn validate(width: u32, height: u32, channels: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height, channels });
        }
        if !(1..=4).contains(&channels) {
            return Err(Error::UnsupportedChannels(channels));
        }
        Ok(())
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved channel count.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Full extent of the image, anchored at the origin.
    #[inline]
    pub fn extent(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image and returns its samples.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of samples in one row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Returns `true` when both images cover the same extent.
    #[inline]
    pub fn same_extent(&self, other: &Image) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Errors with [`Error::DimensionMismatch`] unless both extents match.
    pub fn check_same_extent(&self, other: &Image) -> Result<()> {
        if self.same_extent(other) {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                a_width: self.width,
                a_height: self.height,
                b_width: other.width,
                b_height: other.height,
            })
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Samples of pixel (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let idx = self.offset(x, y);
        &self.data[idx..idx + self.channels as usize]
    }

    /// Pixel (x, y) expanded to RGBA.
    ///
    /// Gray is replicated to RGB and missing alpha reads as 1.
    #[inline]
    pub fn pixel_rgba(&self, x: u32, y: u32) -> [f32; 4] {
        expand_rgba(self.pixel(x, y))
    }

    /// Overwrites pixel (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, value: &[f32]) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        let ch = self.channels as usize;
        let idx = self.offset(x, y);
        let n = value.len().min(ch);
        self.data[idx..idx + n].copy_from_slice(&value[..n]);
        Ok(())
    }

    /// Returns a 4-channel copy of the image.
    ///
    /// All kernels work on RGBA; this is the conversion they run on their
    /// inputs.
    pub fn to_rgba(&self) -> Image {
        if self.channels == 4 {
            return self.clone();
        }
        let data = self
            .data
            .chunks_exact(self.channels as usize)
            .flat_map(expand_rgba)
            .collect();
        Image { width: self.width, height: self.height, channels: 4, data }
    }

    /// Returns a copy with `channels` channels.
    ///
    /// Dropping to 3 removes alpha, dropping to 1 keeps Rec.709 luminance.
    pub fn with_channels(&self, channels: u32) -> Result<Image> {
        if channels == self.channels {
            return Ok(self.clone());
        }
        let rgba = self.to_rgba();
        let data: Vec<f32> = match channels {
            4 => return Ok(rgba),
            3 => rgba.data.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
            2 => rgba
                .data
                .chunks_exact(4)
                .flat_map(|p| [luminance_rec709([p[0], p[1], p[2]]), p[3]])
                .collect(),
            1 => rgba
                .data
                .chunks_exact(4)
                .map(|p| luminance_rec709([p[0], p[1], p[2]]))
                .collect(),
            n => return Err(Error::UnsupportedChannels(n)),
        };
        Image::from_data(self.width, self.height, channels, data)
    }

    /// Iterates over pixel slices in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.channels as usize)
    }
}

#[inline]
fn expand_rgba(px: &[f32]) -> [f32; 4] {
    match px.len() {
        1 => [px[0], px[0], px[0], 1.0],
        2 => [px[0], px[0], px[0], px[1]],
        3 => [px[0], px[1], px[2], 1.0],
        _ => [px[0], px[1], px[2], px[3]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroed() {
        let img = Image::new(3, 2, 4).unwrap();
        assert_eq!(img.data().len(), 24);
        assert!(img.data().iter().all(|&v| v == 0.0));
        assert_eq!(img.extent(), Rect::from_size(3, 2));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(Image::new(0, 2, 4), Err(Error::InvalidDimensions { .. })));
        assert!(matches!(Image::new(2, 2, 5), Err(Error::UnsupportedChannels(5))));
    }

    #[test]
    fn test_filled() {
        let img = Image::filled(2, 2, &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(img.channels(), 3);
        for px in img.pixels() {
            assert_eq!(px, &[0.1, 0.2, 0.3]);
        }
    }

    #[test]
    fn test_to_rgba_gray() {
        let img = Image::from_data(2, 1, 1, vec![0.25, 0.75]).unwrap();
        let rgba = img.to_rgba();
        assert_eq!(rgba.channels(), 4);
        assert_eq!(rgba.pixel(1, 0), &[0.75, 0.75, 0.75, 1.0]);
    }

    #[test]
    fn test_with_channels_drops_alpha() {
        let img = Image::filled(2, 2, &[0.2, 0.4, 0.6, 0.5]).unwrap();
        let rgb = img.with_channels(3).unwrap();
        assert_eq!(rgb.pixel(0, 0), &[0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut img = Image::new(2, 2, 3).unwrap();
        assert!(img.set_pixel(2, 0, &[1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_luminance_white() {
        assert!((luminance_rec709([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    }
}
