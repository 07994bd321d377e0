//! Rotational (spin) blur.
//!
//! Averages `steps` copies of the image rotated about its center by
//! `0, delta, 2 * delta, ...` radians. Borders reflect. A small Gaussian
//! smoothing pass runs first to hide the discrete steps.

use lensfx_core::sample::sample_bilinear;
use lensfx_core::{EdgeMode, Image};
use tracing::debug;

use crate::blur::gaussian_blur_sized;
use crate::filter::Filter;
use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};

/// Default number of rotations.
pub const DEFAULT_STEPS: u32 = 30;
/// Default rotation per step in radians.
pub const DEFAULT_DELTA: f32 = 0.0025;
/// Default smoothing kernel size.
pub const DEFAULT_SMOOTH: usize = 5;

/// Spin blur returning RGBA.
///
/// `smooth` is the odd Gaussian kernel size of the pre-pass; 0 or 1 skips it.
pub fn spin_blur(img: &Image, steps: u32, delta: f32, smooth: usize) -> OpsResult<Image> {
    if steps == 0 {
        return Err(OpsError::InvalidParameter("spin blur needs at least one step".into()));
    }
    debug!(steps, delta, smooth, "spin blur");
    let src = if smooth > 1 { gaussian_blur_sized(img, smooth, 0.0)? } else { img.clone() };

    let rotations: Vec<(f32, f32)> = (0..steps).map(|i| (i as f32 * delta).sin_cos()).collect();
    let (w, h) = (img.width(), img.height());
    let cx = (w / 2) as f32 + 0.5;
    let cy = (h / 2) as f32 + 0.5;
    let inv = 1.0 / steps as f32;

    let mut out = Image::new(w, h, 4)?;
    for_each_row(out.data_mut(), w as usize * 4, |y, row| {
        let dy = y as f32 + 0.5 - cy;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let dx = x as f32 + 0.5 - cx;
            let mut acc = [0.0f32; 4];
            for &(sin, cos) in &rotations {
                let sx = cx + cos * dx - sin * dy;
                let sy = cy + sin * dx + cos * dy;
                let s = sample_bilinear(&src, sx, sy, EdgeMode::Reflect);
                for c in 0..4 {
                    acc[c] += s[c];
                }
            }
            for c in 0..4 {
                px[c] = acc[c] * inv;
            }
        }
    });
    Ok(out)
}

/// Spin blur filter.
#[derive(Debug, Clone)]
pub struct SpinBlur {
    /// Source image.
    pub input: Option<Image>,
    /// Number of rotations averaged.
    pub steps: u32,
    /// Rotation per step in radians.
    pub delta: f32,
    /// Smoothing kernel size.
    pub smooth: usize,
}

impl Default for SpinBlur {
    fn default() -> Self {
        Self { input: None, steps: DEFAULT_STEPS, delta: DEFAULT_DELTA, smooth: DEFAULT_SMOOTH }
    }
}

impl Filter for SpinBlur {
    fn name(&self) -> &'static str {
        "SpinBlur"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        match &self.input {
            Some(input) => spin_blur(input, self.steps, self.delta, self.smooth).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cross() -> Image {
        let mut img = Image::new(21, 21, 3).unwrap();
        for i in 0..21 {
            img.set_pixel(i, 10, &[1.0, 1.0, 1.0]).unwrap();
            img.set_pixel(10, i, &[1.0, 1.0, 1.0]).unwrap();
        }
        img
    }

    #[test]
    fn test_single_step_no_smoothing_is_identity() {
        let img = cross();
        let out = spin_blur(&img, 1, 0.1, 0).unwrap();
        assert_eq!(out, img.to_rgba());
    }

    #[test]
    fn test_center_is_fixed() {
        let out = spin_blur(&cross(), 12, 0.05, 0).unwrap();
        assert_abs_diff_eq!(out.pixel(10, 10)[0], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_spin_smears_far_pixels() {
        let out = spin_blur(&cross(), 20, 0.02, 0).unwrap();
        // The arm's far end spreads sideways, the near part barely moves
        assert!(out.pixel(20, 10)[0] < 0.9);
        assert!(out.pixel(20, 9)[0] > 0.0);
        assert!(out.pixel(11, 10)[0] > out.pixel(20, 10)[0]);
    }

    #[test]
    fn test_flat_image_with_smoothing() {
        let img = Image::filled(16, 9, &[0.4, 0.4, 0.4, 1.0]).unwrap();
        let out = SpinBlur { input: Some(img), ..Default::default() }.output_image().unwrap().unwrap();
        for px in out.pixels() {
            assert_abs_diff_eq!(px[0], 0.4, epsilon = 1e-5);
            assert_abs_diff_eq!(px[3], 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert!(spin_blur(&cross(), 0, 0.1, 0).is_err());
    }
}
