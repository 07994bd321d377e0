//! # lensfx-ops
//!
//! Lens effect kernels and the filters built on them.
//!
//! # Modules
//!
//! - [`kernel`] - named per-pixel kernels and the [`KernelLibrary`]
//! - [`prism`] - chromatic aberration
//! - [`anti_fisheye`] - barrel distortion correction
//! - [`lens_blur`] - hexagonal bokeh blur driven by a mask
//! - [`color_lookup`] - lookup image or `.cube` grading
//! - [`blur`], [`resize`] - Gaussian/box blur and resampling
//! - [`highlight_shadow`], [`vibrance`], [`spin_blur`] - tone and motion effects
//! - [`stats`], [`cct`] - average color, white points, color temperature
//!
//! # Example
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::{AntiFishEye, Filter};
//!
//! let img = Image::filled(64, 48, &[0.5, 0.5, 0.5, 1.0]).unwrap();
//! let filter = AntiFishEye { input: Some(img), factor: 1.5 };
//! let out = filter.output_image().unwrap().unwrap();
//! assert_eq!((out.width(), out.height()), (64, 48));
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - evaluate rows on the rayon pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod parallel;

pub mod anti_fisheye;
pub mod blur;
pub mod cct;
pub mod color_lookup;
pub mod filter;
pub mod highlight_shadow;
pub mod kernel;
pub mod lens_blur;
pub mod prism;
pub mod resize;
pub mod spin_blur;
pub mod stats;
pub mod vibrance;

pub use anti_fisheye::AntiFishEye;
pub use blur::GaussianBlur;
pub use color_lookup::ColorLookup;
pub use error::{OpsError, OpsResult};
pub use filter::Filter;
pub use highlight_shadow::HighlightShadowAdjust;
pub use kernel::{Kernel, KernelArg, KernelLibrary};
pub use lens_blur::LensBlur;
pub use prism::Prism;
pub use resize::ResampleFilter;
pub use spin_blur::SpinBlur;
pub use stats::AreaAverage;
pub use vibrance::Vibrance;
