//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur during LUT operations.
#[derive(Debug, Error)]
pub enum LutError {
    /// Entry count does not match the cube size.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// Lookup image does not have a tiled layout.
    #[error("invalid lookup image {width}x{height}: {reason}")]
    InvalidLookupImage {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// What is wrong with it
        reason: String,
    },

    /// Parse error when loading LUT files.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number, 0 when the error concerns the whole file
        line: usize,
        /// Description
        message: String,
    },

    /// Image buffer error.
    #[error(transparent)]
    Image(#[from] lensfx_core::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LutError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError { line, message: message.into() }
    }
}
