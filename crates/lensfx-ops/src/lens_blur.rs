//! Hexagonal bokeh lens blur.
//!
//! The blur runs as four kernel passes over the input and a depth mask
//! where white is in focus and black is blurred by the full radius:
//!
//! 1. `hexagonalBokehBlurPre` raises the color to `power` so bright spots
//!    dominate, and stores the circle of confusion (`1 - mask`) in alpha.
//! 2. `hexagonalBokehBlurAlphaVertical` averages along the first ray.
//! 3. `hexagonalBokehBlurAlphaDiagonal` averages along the second ray and
//!    adds the first.
//! 4. `hexagonalBokehBlurBravoCharlie` averages the two intermediates along
//!    the remaining rays, divides by three and undoes the power.
//!
//! The three ray directions are 120 degrees apart, so the union of the
//! smeared footprints is a hexagon. A flat image with any mask comes out
//! unchanged.
//!
//! # Example
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::{Filter, LensBlur};
//!
//! let img = Image::filled(24, 16, &[0.8, 0.4, 0.2, 1.0]).unwrap();
//! let mask = Image::filled(24, 16, &[0.0]).unwrap();
//! let blur = LensBlur {
//!     input: Some(img),
//!     mask: Some(mask),
//!     radius: 6.0,
//!     ..Default::default()
//! };
//! let out = blur.output_image().unwrap().unwrap();
//! assert!((out.pixel(12, 8)[0] - 0.8).abs() < 1e-3);
//! ```

use std::f32::consts::PI;

use glam::{Vec2, Vec4};
use lensfx_core::sample::sample_normalized;
use lensfx_core::{EdgeMode, Image, Rect};
use tracing::{debug, warn};

use crate::filter::Filter;
use crate::kernel::{names, render, Args, Kernel, KernelArg, KernelLibrary};
use crate::resize::{resize, ResampleFilter};
use crate::OpsResult;

/// Taps per ray average.
pub const RAY_TAPS: usize = 16;

/// Mean of [`RAY_TAPS`] samples from `uv` toward `uv + delta`, normalized
/// coordinates, edges clamped.
fn ray_average(img: &Image, uv: Vec2, delta: Vec2) -> Vec4 {
    let mut sum = Vec4::ZERO;
    for k in 0..RAY_TAPS {
        let p = uv + delta * ((k as f32 + 0.5) / RAY_TAPS as f32);
        sum += Vec4::from(sample_normalized(img, p.x, p.y, EdgeMode::Clamp));
    }
    sum / RAY_TAPS as f32
}

fn uv_of(img: &Image, x: f32, y: f32) -> Vec2 {
    Vec2::new(x / img.width() as f32, y / img.height() as f32)
}

/// Ray offsets for the three passes, in normalized coordinates.
///
/// Ray `i` points at `angle + i * 2pi/3` with length `radius` pixels.
pub fn ray_deltas(radius: f32, angle: f32, width: u32, height: u32) -> [[f32; 2]; 3] {
    std::array::from_fn(|i| {
        let a = angle + i as f32 * 2.0 * PI / 3.0;
        [radius * a.sin() / width as f32, radius * a.cos() / height as f32]
    })
}

/// Power applied before averaging: `10^clamp(brightness, -1, 1)`.
#[inline]
pub fn brightness_power(brightness: f32) -> f32 {
    10f32.powf(brightness.clamp(-1.0, 1.0))
}

#[inline]
fn pow_rgb(v: Vec4, p: f32) -> [f32; 3] {
    [v.x.max(0.0).powf(p), v.y.max(0.0).powf(p), v.z.max(0.0).powf(p)]
}

/// `hexagonalBokehBlurPre`.
///
/// Arguments: input, mask, power, mask component (0-3), one-minus flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreKernel;

impl Kernel for PreKernel {
    fn name(&self) -> &'static str {
        names::BOKEH_PRE
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let input = a.image(0)?;
        let mask = a.image(1)?;
        let power = a.float(2)?;
        let component = a.int(3)?.clamp(0, 3) as usize;
        let one_minus = a.bool(4)?;

        render(extent, |x, y| {
            let uv = uv_of(input, x, y);
            let color = Vec4::from(sample_normalized(input, uv.x, uv.y, EdgeMode::Clamp));
            let m = sample_normalized(mask, uv.x, uv.y, EdgeMode::Clamp)[component];
            let coc = if one_minus { 1.0 - m } else { m };
            let [r, g, b] = pow_rgb(color, power);
            [r, g, b, coc]
        })
    }
}

/// `hexagonalBokehBlurAlphaVertical`.
///
/// Arguments: pre image, delta 0, delta 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaVerticalKernel;

impl Kernel for AlphaVerticalKernel {
    fn name(&self) -> &'static str {
        names::BOKEH_VERTICAL
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let pre = a.image(0)?;
        let d0 = Vec2::from(a.vec2(1)?);
        a.vec2(2)?;

        render(extent, |x, y| {
            let uv = uv_of(pre, x, y);
            let coc = sample_normalized(pre, uv.x, uv.y, EdgeMode::Clamp)[3];
            let v = ray_average(pre, uv, d0 * coc);
            [v.x, v.y, v.z, coc]
        })
    }
}

/// `hexagonalBokehBlurAlphaDiagonal`.
///
/// Arguments: pre image, delta 0, delta 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaDiagonalKernel;

impl Kernel for AlphaDiagonalKernel {
    fn name(&self) -> &'static str {
        names::BOKEH_DIAGONAL
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let pre = a.image(0)?;
        let d0 = Vec2::from(a.vec2(1)?);
        let d1 = Vec2::from(a.vec2(2)?);

        render(extent, |x, y| {
            let uv = uv_of(pre, x, y);
            let coc = sample_normalized(pre, uv.x, uv.y, EdgeMode::Clamp)[3];
            let v = ray_average(pre, uv, d1 * coc) + ray_average(pre, uv, d0 * coc);
            [v.x, v.y, v.z, coc]
        })
    }
}

/// `hexagonalBokehBlurBravoCharlie`.
///
/// Arguments: vertical image, diagonal image, delta 1, delta 2, inverse
/// power.
#[derive(Debug, Clone, Copy, Default)]
pub struct BravoCharlieKernel;

impl Kernel for BravoCharlieKernel {
    fn name(&self) -> &'static str {
        names::BOKEH_BRAVO_CHARLIE
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let vertical = a.image(0)?;
        let diagonal = a.image(1)?;
        let d1 = Vec2::from(a.vec2(2)?);
        let d2 = Vec2::from(a.vec2(3)?);
        let inv_power = a.float(4)?;

        render(extent, |x, y| {
            let uv = uv_of(vertical, x, y);
            let coc_v = sample_normalized(vertical, uv.x, uv.y, EdgeMode::Clamp)[3];
            let coc_d = sample_normalized(diagonal, uv.x, uv.y, EdgeMode::Clamp)[3];
            let sum = ray_average(vertical, uv, d1 * coc_v) + ray_average(diagonal, uv, d2 * coc_d);
            let [r, g, b] = pow_rgb(sum / 3.0, inv_power);
            [r, g, b, 1.0]
        })
    }
}

/// Hexagonal bokeh blur driven by a depth-style mask.
#[derive(Debug, Clone, Default)]
pub struct LensBlur {
    /// Source image.
    pub input: Option<Image>,
    /// Focus mask, read from the first channel: 1 keeps the pixel sharp, 0
    /// blurs it by the full radius. Resampled to the input size when it
    /// differs.
    pub mask: Option<Image>,
    /// Maximum blur radius in pixels.
    pub radius: f32,
    /// Highlight boost, clamped to [-1, 1].
    pub brightness: f32,
    /// Rotation of the hexagon in radians.
    pub angle: f32,
}

impl LensBlur {
    fn render(&self, lib: &KernelLibrary, input: &Image, mask: &Image) -> OpsResult<Image> {
        let extent = input.extent();
        let deltas = ray_deltas(self.radius, self.angle, input.width(), input.height());
        let power = brightness_power(self.brightness);
        debug!(radius = self.radius, power, angle = self.angle, "lens blur");

        let fitted;
        let mask = if mask.same_extent(input) {
            mask
        } else {
            fitted = resize(mask, input.width(), input.height(), ResampleFilter::Bilinear)?;
            &fitted
        };

        let pre = lib.get(names::BOKEH_PRE)?.apply(
            extent,
            &[
                KernelArg::Image(input),
                KernelArg::Image(mask),
                KernelArg::Float(power),
                KernelArg::Int(0),
                KernelArg::Bool(true),
            ],
        )?;
        let vertical = lib.get(names::BOKEH_VERTICAL)?.apply(
            extent,
            &[KernelArg::Image(&pre), KernelArg::Vec2(deltas[0]), KernelArg::Vec2(deltas[1])],
        )?;
        let diagonal = lib.get(names::BOKEH_DIAGONAL)?.apply(
            extent,
            &[KernelArg::Image(&pre), KernelArg::Vec2(deltas[0]), KernelArg::Vec2(deltas[1])],
        )?;
        lib.get(names::BOKEH_BRAVO_CHARLIE)?.apply(
            extent,
            &[
                KernelArg::Image(&vertical),
                KernelArg::Image(&diagonal),
                KernelArg::Vec2(deltas[1]),
                KernelArg::Vec2(deltas[2]),
                KernelArg::Float(1.0 / power),
            ],
        )
    }

    /// Runs the passes from `lib`; see [`Filter::output_image`].
    pub(crate) fn render_with(&self, lib: &KernelLibrary) -> OpsResult<Option<Image>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        if self.radius <= 0.0 {
            return Ok(Some(input.clone()));
        }
        let Some(mask) = &self.mask else {
            return Ok(None);
        };
        match self.render(lib, input, mask) {
            Ok(out) => Ok(Some(out)),
            Err(e) => {
                warn!(error = %e, "lens blur failed, passing input through");
                Ok(Some(input.clone()))
            }
        }
    }
}

impl Filter for LensBlur {
    fn name(&self) -> &'static str {
        "LensBlur"
    }

    /// `None` without an input, or without a mask when `radius > 0`.
    /// A non-positive radius returns the input. If any pass fails the input
    /// is returned and the failure is logged.
    fn output_image(&self) -> OpsResult<Option<Image>> {
        self.render_with(KernelLibrary::global())
    }
}
