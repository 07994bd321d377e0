//! Chromatic aberration.
//!
//! Each output pixel gathers several samples along the ray from the image
//! center. Sample `i` of `n` sits at spectral position `t = (i + 0.5) / n`
//! and is pushed outward by
//! `distortion * r2 + strength * separation * (t - 0.5) * r2`, where `r2` is
//! the squared aspect-corrected distance from the center in normalized
//! coordinates. Samples are tinted with a smooth red-green-blue spectrum and
//! each channel is normalized by its total weight, so flat regions keep
//! their color and edges split into fringes.

use glam::Vec2;
use lensfx_core::sample::sample_normalized;
use lensfx_core::{EdgeMode, Image, Rect};
use tracing::trace;

use crate::filter::Filter;
use crate::kernel::{names, render, Args, Kernel, KernelArg, KernelLibrary};
use crate::OpsResult;

/// Spectral weight of position `t` in `[0, 1]`: red at 0, green at 0.5,
/// blue at 1.
#[inline]
pub fn spectrum_weight(t: f32) -> [f32; 3] {
    let s = 1.0 - t;
    [s * s, 2.0 * t * s, t * t]
}

/// The `prism` kernel.
///
/// Arguments: input image, image size `(w, h)`, distortion, iterations,
/// strength, separation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrismKernel;

impl Kernel for PrismKernel {
    fn name(&self) -> &'static str {
        names::PRISM
    }

    fn apply(&self, extent: Rect, args: &[KernelArg<'_>]) -> OpsResult<Image> {
        let a = Args::new(self.name(), args);
        let input = a.image(0)?;
        let size = Vec2::from(a.vec2(1)?).max(Vec2::ONE);
        let distortion = a.float(2)?;
        let samples = (a.float(3)?.round() as i64).clamp(1, 256) as usize;
        let shift = a.float(4)? * a.float(5)?;
        let aspect = size.x / size.y;
        trace!(samples, distortion, shift, "prism");

        render(extent, |x, y| {
            let d = Vec2::new(x, y) / size - 0.5;
            let r2 = Vec2::new(d.x * aspect, d.y).length_squared();

            let mut sum = [0.0f32; 3];
            let mut total = [0.0f32; 3];
            for i in 0..samples {
                let t = (i as f32 + 0.5) / samples as f32;
                let scale = 1.0 + distortion * r2 + shift * (t - 0.5) * r2;
                let uv = d * scale + 0.5;
                let px = sample_normalized(input, uv.x, uv.y, EdgeMode::Clamp);
                let w = spectrum_weight(t);
                for c in 0..3 {
                    sum[c] += px[c] * w[c];
                    total[c] += w[c];
                }
            }

            let center = sample_normalized(input, x / size.x, y / size.y, EdgeMode::Clamp);
            [sum[0] / total[0], sum[1] / total[1], sum[2] / total[2], center[3]]
        })
    }
}

/// Chromatic aberration filter.
#[derive(Debug, Clone, Default)]
pub struct Prism {
    /// Source image.
    pub input: Option<Image>,
    /// Radial distortion applied to every sample.
    pub distortion: f32,
    /// Number of spectral samples (at least 1 is taken).
    pub iterations: f32,
    /// Overall fringe strength.
    pub strength: f32,
    /// Spread between the red and blue samples.
    pub separation: f32,
}

impl Filter for Prism {
    fn name(&self) -> &'static str {
        "Prism"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        let kernel = KernelLibrary::global().get(names::PRISM)?;
        let size = [input.width() as f32, input.height() as f32];
        let out = kernel.apply(
            input.extent(),
            &[
                KernelArg::Image(input),
                KernelArg::Vec2(size),
                KernelArg::Float(self.distortion),
                KernelArg::Float(self.iterations),
                KernelArg::Float(self.strength),
                KernelArg::Float(self.separation),
            ],
        )?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient() -> Image {
        let mut img = Image::new(16, 12, 4).unwrap();
        for y in 0..12 {
            for x in 0..16 {
                let v = [x as f32 / 15.0, y as f32 / 11.0, 0.5, 0.75];
                img.set_pixel(x, y, &v).unwrap();
            }
        }
        img
    }

    #[test]
    fn test_spectrum_sums() {
        let w = spectrum_weight(0.5);
        assert_abs_diff_eq!(w[0] + w[1] + w[2], 1.0);
        assert_eq!(spectrum_weight(0.0), [1.0, 0.0, 0.0]);
        assert_eq!(spectrum_weight(1.0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_defaults_are_identity() {
        let img = gradient();
        let prism = Prism { input: Some(img.clone()), ..Default::default() };
        let out = prism.output_image().unwrap().unwrap();
        for (a, b) in out.data().iter().zip(img.data()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_flat_image_unchanged() {
        let img = Image::filled(10, 10, &[0.3, 0.6, 0.9, 1.0]).unwrap();
        let prism = Prism {
            input: Some(img),
            distortion: 0.3,
            iterations: 8.0,
            strength: 1.0,
            separation: 0.8,
        };
        let out = prism.output_image().unwrap().unwrap();
        for px in out.pixels() {
            assert_abs_diff_eq!(px[0], 0.3, epsilon = 1e-5);
            assert_abs_diff_eq!(px[1], 0.6, epsilon = 1e-5);
            assert_abs_diff_eq!(px[2], 0.9, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_fringes_split_channels() {
        let img = gradient();
        let prism = Prism {
            input: Some(img.clone()),
            iterations: 6.0,
            strength: 1.0,
            separation: 1.0,
            ..Default::default()
        };
        let out = prism.output_image().unwrap().unwrap();
        // Corner pixels move; the red channel reads a different spot than blue
        assert!((out.pixel(0, 0)[0] - img.pixel(0, 0)[0]).abs() > 1e-4);
    }

    #[test]
    fn test_huge_distortion_clamps_to_edges() {
        let img = gradient();
        let prism = Prism {
            input: Some(img.clone()),
            distortion: 1e30,
            iterations: 1.0,
            ..Default::default()
        };
        let out = prism.output_image().unwrap().unwrap();
        assert_eq!(out.extent(), img.extent());
        assert!(out.data().iter().all(|v| v.is_finite()));
        // Every sample lands past a corner, which clamps to a corner pixel
        let corner = |x, y| img.pixel(x, y)[0];
        for v in [out.pixel(1, 1)[0], out.pixel(14, 10)[0]] {
            assert!([corner(0, 0), corner(15, 0), corner(0, 11), corner(15, 11)]
                .iter()
                .any(|c| (c - v).abs() < 1e-4));
        }
    }

    #[test]
    fn test_missing_input() {
        assert!(Prism::default().output_image().unwrap().is_none());
    }
}
