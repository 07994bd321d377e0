//! Color temperature and tint estimates.
//!
//! Inputs are sRGB-encoded values in `[0, 1]`.
//!
//! ```rust
//! use lensfx_ops::cct::color_temperature;
//!
//! let k = color_temperature([1.0, 1.0, 1.0]).unwrap();
//! assert!((k - 6504.0).abs() < 50.0);
//! ```

use glam::{Mat3, Vec3};

/// Linear sRGB (D65) to CIE XYZ.
pub const SRGB_TO_XYZ: Mat3 = Mat3::from_cols(
    Vec3::new(0.4124564, 0.2126729, 0.0193339),
    Vec3::new(0.3575761, 0.7151522, 0.1191920),
    Vec3::new(0.1804375, 0.0721750, 0.9503041),
);

/// sRGB transfer function decode.
#[inline]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v > 0.04045 {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    }
}

/// sRGB-encoded color to XYZ.
pub fn rgb_to_xyz(rgb: [f32; 3]) -> Vec3 {
    SRGB_TO_XYZ * Vec3::from(rgb.map(srgb_to_linear))
}

/// McCamy's correlated color temperature for an XYZ color, in kelvin.
///
/// `None` for black, or where the chromaticity sits on the formula's pole.
pub fn mccamy(xyz: Vec3) -> Option<f32> {
    let sum = xyz.x + xyz.y + xyz.z;
    if sum <= 0.0 {
        return None;
    }
    let (x, y) = (xyz.x / sum, xyz.y / sum);
    let denom = 0.1858 - y;
    if denom.abs() < 1e-9 {
        return None;
    }
    let n = (x - 0.3320) / denom;
    Some(437.0 * n * n * n + 3601.0 * n * n + 6861.0 * n + 5517.0)
}

/// Correlated color temperature of an sRGB color.
pub fn color_temperature(rgb: [f32; 3]) -> Option<f32> {
    mccamy(rgb_to_xyz(rgb))
}

/// Empirical warmth estimate, returned as an offset from 6500 K.
///
/// Black and near-black read as 0.
pub fn kelvin_offset(rgb: [f32; 3]) -> i32 {
    let [r, g, b] = rgb;
    let x = r * 0.257 + g * 0.434 + b * 0.091;
    let y = r * 0.247 + g * 0.420 + b * 0.065;
    let kelvin = if x + y > 0.01 { 10000.0 / (x + y).sqrt() } else { 6500.0 };
    kelvin as i32 - 6500
}

/// Red/blue balance `(r - b) / (r + b)`, 0 when both are 0.
pub fn tint(rgb: [f32; 3]) -> f32 {
    let sum = rgb[0] + rgb[2];
    if sum == 0.0 { 0.0 } else { (rgb[0] - rgb[2]) / sum }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linearize() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert_abs_diff_eq!(srgb_to_linear(1.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(srgb_to_linear(0.5), 0.2140, epsilon = 1e-4);
    }

    #[test]
    fn test_white_is_d65() {
        let xyz = rgb_to_xyz([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(xyz.y, 1.0, epsilon = 1e-5);
        let k = color_temperature([1.0, 1.0, 1.0]).unwrap();
        assert!((6400.0..6600.0).contains(&k), "{k}");
    }

    #[test]
    fn test_warm_vs_cool() {
        let warm = color_temperature([1.0, 0.8, 0.6]).unwrap();
        let cool = color_temperature([0.6, 0.8, 1.0]).unwrap();
        assert!(warm < cool);
        assert!(color_temperature([0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_kelvin_offset() {
        assert_eq!(kelvin_offset([0.0, 0.0, 0.0]), 0);
        assert_eq!(kelvin_offset([1.0, 1.0, 1.0]), 1627);
    }

    #[test]
    fn test_tint() {
        assert_eq!(tint([0.0, 0.5, 0.0]), 0.0);
        assert_abs_diff_eq!(tint([0.75, 0.0, 0.25]), 0.5);
        assert_abs_diff_eq!(tint([0.25, 0.0, 0.75]), -0.5);
    }
}
