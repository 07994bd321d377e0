//! Error types for lensfx-core operations.
//!
//! # Usage
//!
//! ```rust
//! use lensfx_core::{Error, Result};
//!
//! fn check(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::OutOfBounds { x, y, width, height });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during image buffer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Buffer length does not match the declared dimensions.
    #[error("buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSize {
        /// Samples implied by width * height * channels
        expected: usize,
        /// Samples actually provided
        actual: usize,
    },

    /// Width, height or channel count is zero or otherwise unusable.
    #[error("invalid dimensions: {width}x{height}x{channels}")]
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Channel count
        channels: u32,
    },

    /// Channel count outside the supported 1..=4 range.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    /// Two images that must share an extent do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: u32,
        /// First image height
        a_height: u32,
        /// Second image width
        b_width: u32,
        /// Second image height
        b_height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::OutOfBounds { x: 100, y: 50, width: 80, height: 60 };
        assert!(err.to_string().contains("100"));

        let err = Error::BufferSize { expected: 12, actual: 9 };
        assert_eq!(err.to_string(), "buffer size mismatch: expected 12 samples, got 9");
    }
}
