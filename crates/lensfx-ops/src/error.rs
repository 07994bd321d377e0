//! Error types for kernels and filters.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No kernel registered under this name.
    #[error("kernel not found: {0}")]
    KernelNotFound(String),

    /// A kernel was called with a missing or mistyped argument.
    #[error("kernel {kernel}: argument {index} must be {expected}")]
    KernelArgument {
        /// Kernel name
        kernel: &'static str,
        /// Position in the argument list
        index: usize,
        /// Expected argument kind
        expected: &'static str,
    },

    /// Image buffer error.
    #[error(transparent)]
    Image(#[from] lensfx_core::Error),

    /// Lookup table error.
    #[error(transparent)]
    Lut(#[from] lensfx_lut::LutError),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
