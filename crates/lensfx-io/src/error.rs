//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format or extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Format is known but its feature is compiled out.
    #[error("format {0} is disabled in this build")]
    FeatureDisabled(&'static str),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth or color type.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Image dimensions exceed what a format can store.
    #[error("dimensions {width}x{height} exceed {format} limits")]
    TooLarge {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Format name
        format: &'static str,
    },

    /// Decoded buffer is inconsistent with the image header.
    #[error(transparent)]
    Image(#[from] lensfx_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
