//! # lensfx-core
//!
//! Core types shared by every lensfx crate:
//!
//! - [`Image`] - Owned, row-major `f32` pixel buffer
//! - [`Rect`] - Pixel extents and regions of interest
//! - [`sample`] - Bilinear sampling with edge handling
//! - [`Error`] - Error type for buffer and geometry operations
//!
//! ## Crate Structure
//!
//! ```text
//! lensfx-core (this crate)
//!    ^
//!    |
//!    +-- lensfx-lut (3D LUTs, lookup images)
//!    +-- lensfx-io (PNG / JPEG / TIFF / WebP)
//!    +-- lensfx-ops (kernels and filters)
//!    +-- lensfx-cli
//! ```
//!
//! ## Pixel coordinates
//!
//! Integer pixel `(i, j)` covers the square `[i, i+1) x [j, j+1)`, so its
//! center sits at `(i + 0.5, j + 0.5)`. Sampling functions take continuous
//! coordinates in that space; normalized coordinates map `[0, 1]` onto the
//! full extent.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod rect;
pub mod sample;

pub use error::{Error, Result};
pub use image::{luminance_rec709, Image, REC709_LUMA};
pub use rect::Rect;
pub use sample::EdgeMode;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::rect::Rect;
    pub use crate::sample::{sample_bilinear, sample_normalized, EdgeMode};
}
