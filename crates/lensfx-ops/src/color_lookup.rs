//! Color grading through a lookup table.
//!
//! The table is either a tiled lookup image (the usual 512x512 layout with
//! 8x8 tiles of 64 levels, see [`lensfx_lut::lookup_image`]) or a parsed
//! `.cube` [`Lut3D`]. The graded color is blended with the original by
//! `intensity`; alpha is kept.

use lensfx_core::sample::sample_bilinear;
use lensfx_core::{EdgeMode, Image, Rect};
use lensfx_lut::{lookup_image, Interpolation, Lut3D};
use tracing::trace;

use crate::filter::Filter;
use crate::kernel::{names, render, Args, Kernel, KernelArg, KernelLibrary};
use crate::{OpsError, OpsResult};

/// The `lookup` kernel.
///
/// Arguments: input image, table (lookup image or LUT), intensity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupKernel;

impl Kernel for LookupKernel {
    fn name(&self) -> &'static str {
        names::LOOKUP
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let input = a.image(0)?;
        let decoded;
        let lut = match a.get(1)? {
            KernelArg::Lut(lut) => lut,
            KernelArg::Image(table) => {
                decoded = lookup_image::from_image(table)?.with_interpolation(Interpolation::Linear);
                &decoded
            }
            _ => {
                return Err(OpsError::KernelArgument {
                    kernel: self.name(),
                    index: 1,
                    expected: "a lookup image or LUT",
                });
            }
        };
        let intensity = a.float(2)?;
        trace!(size = lut.size, intensity, "lookup");

        render(extent, |x, y| {
            let src = sample_bilinear(input, x, y, EdgeMode::Clamp);
            let graded = lut.apply([src[0], src[1], src[2]]);
            let mix = |a: f32, b: f32| a + (b - a) * intensity;
            [mix(src[0], graded[0]), mix(src[1], graded[1]), mix(src[2], graded[2]), src[3]]
        })
    }
}

/// Lookup-table color grade.
#[derive(Debug, Clone)]
pub struct ColorLookup {
    /// Source image.
    pub input: Option<Image>,
    /// Tiled lookup image.
    pub lookup_table: Option<Image>,
    /// `.cube` table, used when no lookup image is set.
    pub cube: Option<Lut3D>,
    /// Blend between the original (0) and the graded color (1).
    pub intensity: f32,
}

impl Default for ColorLookup {
    fn default() -> Self {
        Self { input: None, lookup_table: None, cube: None, intensity: 1.0 }
    }
}

impl Filter for ColorLookup {
    fn name(&self) -> &'static str {
        "ColorLookup"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        let table = match (&self.lookup_table, &self.cube) {
            (Some(img), _) => KernelArg::Image(img),
            (None, Some(lut)) => KernelArg::Lut(lut),
            (None, None) => return Ok(None),
        };
        let kernel = KernelLibrary::global().get(names::LOOKUP)?;
        let out = kernel.apply(
            input.extent(),
            &[KernelArg::Image(input), table, KernelArg::Float(self.intensity)],
        )?;
        Ok(Some(out))
    }
}
