//! Bilinear sampling.
//!
//! Kernels compute a source coordinate for each destination pixel and read
//! the input through these helpers, the same way a GPU sampler would.
//! Coordinates are continuous with pixel centers at `i + 0.5`.

use crate::Image;

/// Sample coordinates are clamped to this many pixels either side of the
/// origin, far past any edge but small enough for integer neighbors.
const COORD_LIMIT: f32 = (1u32 << 30) as f32;

/// What to return for coordinates outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Repeat the nearest edge pixel.
    #[default]
    Clamp,
    /// Mirror at the edge, repeating the border pixel (`cba|abc|cba`).
    Reflect,
    /// Transparent black.
    Black,
}

impl EdgeMode {
    /// Maps an integer index into `0..n`, or `None` for [`EdgeMode::Black`]
    /// outside the range.
    #[inline]
    fn resolve(self, i: i64, n: i64) -> Option<i64> {
        if (0..n).contains(&i) {
            return Some(i);
        }
        match self {
            EdgeMode::Clamp => Some(i.clamp(0, n - 1)),
            EdgeMode::Reflect => {
                let period = 2 * n;
                let m = i.rem_euclid(period);
                Some(if m < n { m } else { period - 1 - m })
            }
            EdgeMode::Black => None,
        }
    }
}

#[inline]
fn fetch(img: &Image, x: i64, y: i64, mode: EdgeMode) -> [f32; 4] {
    let w = img.width() as i64;
    let h = img.height() as i64;
    match (mode.resolve(x, w), mode.resolve(y, h)) {
        (Some(sx), Some(sy)) => img.pixel_rgba(sx as u32, sy as u32),
        _ => [0.0; 4],
    }
}

/// Bilinear sample at continuous pixel coordinates, returned as RGBA.
///
/// ```rust
/// use lensfx_core::{Image, sample::sample_bilinear, EdgeMode};
///
/// let img = Image::from_data(2, 1, 1, vec![0.0, 1.0]).unwrap();
/// // Halfway between the two pixel centers
/// let v = sample_bilinear(&img, 1.0, 0.5, EdgeMode::Clamp);
/// assert!((v[0] - 0.5).abs() < 1e-6);
/// ```
pub fn sample_bilinear(img: &Image, x: f32, y: f32, mode: EdgeMode) -> [f32; 4] {
    let fx = (x - 0.5).clamp(-COORD_LIMIT, COORD_LIMIT);
    let fy = (y - 0.5).clamp(-COORD_LIMIT, COORD_LIMIT);
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let p00 = fetch(img, x0, y0, mode);
    let p10 = fetch(img, x0 + 1, y0, mode);
    let p01 = fetch(img, x0, y0 + 1, mode);
    let p11 = fetch(img, x0 + 1, y0 + 1, mode);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * tx;
        let bot = p01[c] + (p11[c] - p01[c]) * tx;
        out[c] = top + (bot - top) * ty;
    }
    out
}

/// Bilinear sample at normalized coordinates, `(0, 0)` top-left and
/// `(1, 1)` bottom-right.
#[inline]
pub fn sample_normalized(img: &Image, u: f32, v: f32, mode: EdgeMode) -> [f32; 4] {
    sample_bilinear(img, u * img.width() as f32, v * img.height() as f32, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp() -> Image {
        Image::from_data(4, 1, 1, vec![0.0, 0.25, 0.5, 0.75]).unwrap()
    }

    #[test]
    fn test_pixel_center_is_exact() {
        let img = ramp();
        for i in 0..4 {
            let v = sample_bilinear(&img, i as f32 + 0.5, 0.5, EdgeMode::Clamp);
            assert_abs_diff_eq!(v[0], i as f32 * 0.25, epsilon = 1e-6);
            assert_abs_diff_eq!(v[3], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_clamp_outside() {
        let img = ramp();
        let v = sample_bilinear(&img, -10.0, 0.5, EdgeMode::Clamp);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-6);
        let v = sample_bilinear(&img, 50.0, 0.5, EdgeMode::Clamp);
        assert_abs_diff_eq!(v[0], 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_black_outside() {
        let img = ramp();
        let v = sample_bilinear(&img, -10.0, 0.5, EdgeMode::Black);
        assert_eq!(v, [0.0; 4]);
    }

    #[test]
    fn test_far_coordinates_hit_edges() {
        let img = ramp();
        for mode in [EdgeMode::Clamp, EdgeMode::Reflect, EdgeMode::Black] {
            for x in [1e30, -1e30, f32::MAX, f32::MIN, 1e10] {
                let v = sample_bilinear(&img, x, x, mode);
                assert!(v.iter().all(|c| c.is_finite()), "{mode:?} at {x}");
            }
        }
        let v = sample_bilinear(&img, 1e30, 0.5, EdgeMode::Clamp);
        assert_abs_diff_eq!(v[0], 0.75, epsilon = 1e-6);
        let v = sample_bilinear(&img, -1e30, 0.5, EdgeMode::Clamp);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-6);
        assert_eq!(sample_bilinear(&img, 1e30, 0.5, EdgeMode::Black), [0.0; 4]);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(EdgeMode::Reflect.resolve(-1, 4), Some(0));
        assert_eq!(EdgeMode::Reflect.resolve(-2, 4), Some(1));
        assert_eq!(EdgeMode::Reflect.resolve(4, 4), Some(3));
        assert_eq!(EdgeMode::Reflect.resolve(5, 4), Some(2));
    }

    #[test]
    fn test_normalized_center() {
        let img = Image::filled(8, 8, &[0.3, 0.6, 0.9, 1.0]).unwrap();
        let v = sample_normalized(&img, 0.5, 0.5, EdgeMode::Clamp);
        assert_abs_diff_eq!(v[1], 0.6, epsilon = 1e-6);
    }
}
