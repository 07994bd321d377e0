//! Fisheye (barrel) distortion correction.
//!
//! For an output pixel at distance `r` from the center, the source is read
//! at `bind * atan(r / bind * factor) / atan(factor)` along the same
//! direction, with `bind` the shorter half-extent. Larger factors pull the
//! edges in harder; `factor <= 0` leaves the image untouched.

use glam::Vec2;
use lensfx_core::sample::sample_bilinear;
use lensfx_core::{EdgeMode, Image, Rect};

use crate::filter::Filter;
use crate::kernel::{names, render, Args, Kernel, KernelArg, KernelLibrary};
use crate::OpsResult;

/// Source radius for an output radius `r`.
#[inline]
pub fn source_radius(r: f32, bind: f32, factor: f32) -> f32 {
    if factor <= 0.0 || bind <= 0.0 {
        return r;
    }
    bind * (r / bind * factor).atan() / factor.atan()
}

/// The `antiFishEye` kernel.
///
/// Arguments: input image, center `(w/2, h/2)` in pixels, factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AntiFishEyeKernel;

impl Kernel for AntiFishEyeKernel {
    fn name(&self) -> &'static str {
        names::ANTI_FISHEYE
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let input = a.image(0)?;
        let center = Vec2::from(a.vec2(1)?);
        let factor = a.float(2)?;
        let bind = center.x.min(center.y);

        render(extent, |x, y| {
            let v = Vec2::new(x, y) - center;
            let r = v.length();
            let src = if r > 0.0 {
                center + v * (source_radius(r, bind, factor) / r)
            } else {
                center
            };
            sample_bilinear(input, src.x, src.y, EdgeMode::Clamp)
        })
    }
}

/// Fisheye correction filter.
#[derive(Debug, Clone, Default)]
pub struct AntiFishEye {
    /// Source image.
    pub input: Option<Image>,
    /// Correction strength.
    pub factor: f32,
}

impl Filter for AntiFishEye {
    fn name(&self) -> &'static str {
        "AntiFishEye"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        let kernel = KernelLibrary::global().get(names::ANTI_FISHEYE)?;
        let center = [input.width() as f32 / 2.0, input.height() as f32 / 2.0];
        let out = kernel.apply(
            input.extent(),
            &[KernelArg::Image(input), KernelArg::Vec2(center), KernelArg::Float(self.factor)],
        )?;
        Ok(Some(out))
    }
}
