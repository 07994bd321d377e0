//! The filter interface.
//!
//! A filter is a bag of public parameters plus [`Filter::output_image`].
//! Setting fields and asking for the output mirrors how the demo driver
//! chains effects:
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::{Filter, Prism};
//!
//! let img = Image::filled(16, 16, &[0.2, 0.4, 0.6, 1.0]).unwrap();
//! let mut prism = Prism::default();
//! prism.input = Some(img.clone());
//! prism.strength = 0.5;
//! prism.separation = 0.5;
//! let out = prism.output_image().unwrap().unwrap();
//! assert_eq!(out.extent(), img.extent());
//! ```

use lensfx_core::Image;

use crate::OpsResult;

/// An image filter with named parameters.
pub trait Filter {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Renders the filter.
    ///
    /// `Ok(None)` means a required input is not set. Errors are reserved
    /// for kernel failures the filter cannot recover from.
    fn output_image(&self) -> OpsResult<Option<Image>>;
}
