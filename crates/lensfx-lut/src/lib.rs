//! # lensfx-lut
//!
//! 3D lookup tables for the lensfx color lookup filter.
//!
//! - [`Lut3D`] - RGB cube with nearest, trilinear or tetrahedral lookup
//! - [`cube`] - Adobe/Resolve `.cube` read and write
//! - [`lookup_image`] - tiled lookup images (the 512x512 "lookup.png" kind)
//!
//! # Usage
//!
//! ```rust
//! use lensfx_lut::{Lut3D, Interpolation};
//!
//! let lut = Lut3D::identity(33).with_interpolation(Interpolation::Tetrahedral);
//! let rgb = lut.apply([0.5, 0.3, 0.2]);
//! assert!((rgb[1] - 0.3).abs() < 1e-5);
//! ```
//!
//! # Dependencies
//!
//! - [`lensfx-core`] - Image buffer for lookup images
//! - [`thiserror`] - Error handling

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod interp;
mod lut3d;
pub mod cube;
pub mod lookup_image;

pub use cube::{read_3d as read_cube, write_3d as write_cube};
pub use error::{LutError, LutResult};
pub use interp::Interpolation;
pub use lookup_image::TileLayout;
pub use lut3d::Lut3D;
