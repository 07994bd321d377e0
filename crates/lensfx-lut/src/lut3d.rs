//! 3-dimensional lookup table.
//!
//! A 3D LUT maps RGB input to RGB output through a cube of color values.
//! lensfx loads them from `.cube` files or from tiled lookup images and
//! uses them for color grading in the lookup filter.

use crate::{Interpolation, LutError, LutResult};

/// A 3-dimensional lookup table.
///
/// # Structure
///
/// - `size^3` entries, each an RGB output value
/// - Stored with R varying fastest, then G, then B (the `.cube` order)
/// - Input is normalized through `domain_min..domain_max` and clamped
///
/// # Example
///
/// ```rust
/// use lensfx_lut::Lut3D;
///
/// let lut = Lut3D::identity(33);
/// let out = lut.apply([0.5, 0.3, 0.2]);
/// assert!((out[0] - 0.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Flattened as `[(r0,g0,b0), (r1,g0,b0), ..., (rN,gN,bN)]`
    pub data: Vec<[f32; 3]>,
    /// Grid points per axis
    pub size: usize,
    /// Input domain minimum (per channel)
    pub domain_min: [f32; 3],
    /// Input domain maximum (per channel)
    pub domain_max: [f32; 3],
    /// Interpolation method
    pub interpolation: Interpolation,
}

impl Lut3D {
    /// Creates an identity (pass-through) 3D LUT.
    ///
    /// # Panics
    ///
    /// Panics if `size < 2`.
    pub fn identity(size: usize) -> Self {
        assert!(size >= 2, "3D LUT needs at least 2 grid points per axis");
        Self::from_fn(size, |rgb| rgb)
    }

    /// Builds a LUT by evaluating `f` at every grid point.
    ///
    /// ```rust
    /// use lensfx_lut::Lut3D;
    ///
    /// let invert = Lut3D::from_fn(17, |[r, g, b]| [1.0 - r, 1.0 - g, 1.0 - b]);
    /// let out = invert.apply([0.25, 0.5, 1.0]);
    /// assert!((out[0] - 0.75).abs() < 1e-5);
    /// ```
    pub fn from_fn<F>(size: usize, f: F) -> Self
    where
        F: Fn([f32; 3]) -> [f32; 3],
    {
        let n = (size.max(2) - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push(f([r as f32 / n, g as f32 / n, b as f32 / n]));
                }
            }
        }
        Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            interpolation: Interpolation::Linear,
        }
    }

    /// Creates a 3D LUT from raw data in R-fastest order.
    pub fn from_data(data: Vec<[f32; 3]>, size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!("size {size} is below the minimum of 2")));
        }
        let expected = size * size * size;
        if data.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} entries for size {}, got {}",
                expected,
                size,
                data.len()
            )));
        }
        Ok(Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            interpolation: Interpolation::Linear,
        })
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Sets the interpolation method.
    pub fn with_interpolation(mut self, interp: Interpolation) -> Self {
        self.interpolation = interp;
        self
    }

    #[inline]
    pub(crate) fn index(&self, r: usize, g: usize, b: usize) -> usize {
        b * self.size * self.size + g * self.size + r
    }

    /// Value at grid position (r, g, b).
    #[inline]
    pub fn get(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        self.data[self.index(r, g, b)]
    }

    /// Applies the LUT to an RGB value.
    ///
    /// A single-entry table maps everything to that entry. A table whose
    /// `data` does not hold `size^3` entries returns `rgb` unchanged.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match (self.size, self.data.len()) {
            (1, 1) => return self.data[0],
            (size, len) if size < 2 || size.checked_pow(3) != Some(len) => return rgb,
            _ => {}
        }
        match self.interpolation {
            Interpolation::Nearest => self.apply_nearest(rgb),
            Interpolation::Linear => self.apply_trilinear(rgb),
            Interpolation::Tetrahedral => self.apply_tetrahedral(rgb),
        }
    }

    fn apply_nearest(&self, rgb: [f32; 3]) -> [f32; 3] {
        let [r, g, b] = self.normalize(rgb);
        let n = (self.size - 1) as f32;
        let max = self.size - 1;
        self.get(
            ((r * n).round() as usize).min(max),
            ((g * n).round() as usize).min(max),
            ((b * n).round() as usize).min(max),
        )
    }

    /// Grid cell origin and fractional position inside it.
    #[inline]
    fn locate(&self, v: f32) -> (usize, f32) {
        let n = (self.size - 1) as f32;
        let i = ((v * n).floor() as usize).min(self.size - 2);
        (i, v * n - i as f32)
    }

    fn corners(&self, ri: usize, gi: usize, bi: usize) -> [[f32; 3]; 8] {
        [
            self.get(ri, gi, bi),
            self.get(ri + 1, gi, bi),
            self.get(ri, gi + 1, bi),
            self.get(ri + 1, gi + 1, bi),
            self.get(ri, gi, bi + 1),
            self.get(ri + 1, gi, bi + 1),
            self.get(ri, gi + 1, bi + 1),
            self.get(ri + 1, gi + 1, bi + 1),
        ]
    }

    fn apply_trilinear(&self, rgb: [f32; 3]) -> [f32; 3] {
        let [r, g, b] = self.normalize(rgb);
        let (ri, rf) = self.locate(r);
        let (gi, gf) = self.locate(g);
        let (bi, bf) = self.locate(b);
        let [c000, c100, c010, c110, c001, c101, c011, c111] = self.corners(ri, gi, bi);

        let mut result = [0.0f32; 3];
        for i in 0..3 {
            let c00 = c000[i] * (1.0 - rf) + c100[i] * rf;
            let c01 = c001[i] * (1.0 - rf) + c101[i] * rf;
            let c10 = c010[i] * (1.0 - rf) + c110[i] * rf;
            let c11 = c011[i] * (1.0 - rf) + c111[i] * rf;

            let c0 = c00 * (1.0 - gf) + c10 * gf;
            let c1 = c01 * (1.0 - gf) + c11 * gf;

            result[i] = c0 * (1.0 - bf) + c1 * bf;
        }
        result
    }

    fn apply_tetrahedral(&self, rgb: [f32; 3]) -> [f32; 3] {
        let [r, g, b] = self.normalize(rgb);
        let (ri, rf) = self.locate(r);
        let (gi, gf) = self.locate(g);
        let (bi, bf) = self.locate(b);
        let [c000, c100, c010, c110, c001, c101, c011, c111] = self.corners(ri, gi, bi);

        let mut result = [0.0f32; 3];
        for i in 0..3 {
            result[i] = if rf > gf {
                if gf > bf {
                    c000[i] + rf * (c100[i] - c000[i]) + gf * (c110[i] - c100[i]) + bf * (c111[i] - c110[i])
                } else if rf > bf {
                    c000[i] + rf * (c100[i] - c000[i]) + bf * (c101[i] - c100[i]) + gf * (c111[i] - c101[i])
                } else {
                    c000[i] + bf * (c001[i] - c000[i]) + rf * (c101[i] - c001[i]) + gf * (c111[i] - c101[i])
                }
            } else if gf > bf {
                if rf > bf {
                    c000[i] + gf * (c010[i] - c000[i]) + rf * (c110[i] - c010[i]) + bf * (c111[i] - c110[i])
                } else {
                    c000[i] + gf * (c010[i] - c000[i]) + bf * (c011[i] - c010[i]) + rf * (c111[i] - c011[i])
                }
            } else {
                c000[i] + bf * (c001[i] - c000[i]) + gf * (c011[i] - c001[i]) + rf * (c111[i] - c011[i])
            };
        }
        result
    }

    /// Maps input through the domain into `[0, 1]`, clamped.
    fn normalize(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for c in 0..3 {
            let span = self.domain_max[c] - self.domain_min[c];
            let v = if span.abs() > f32::EPSILON {
                (rgb[c] - self.domain_min[c]) / span
            } else {
                0.0
            };
            // NaN input lands on the black corner
            out[c] = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_all_methods() {
        for interp in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Tetrahedral] {
            let lut = Lut3D::identity(33).with_interpolation(interp);
            let out = lut.apply([0.25, 0.5, 0.75]);
            assert_abs_diff_eq!(out[0], 0.25, epsilon = 0.02);
            assert_abs_diff_eq!(out[1], 0.5, epsilon = 0.02);
            assert_abs_diff_eq!(out[2], 0.75, epsilon = 0.02);
        }
    }

    #[test]
    fn test_trilinear_exact_for_linear_map() {
        // Trilinear interpolation reproduces an affine map exactly
        let lut = Lut3D::from_fn(5, |[r, g, b]| [0.5 * r + 0.1, g * g, 1.0 - b]);
        let out = lut.apply([0.3, 0.5, 0.7]);
        assert_abs_diff_eq!(out[0], 0.25, epsilon = 1e-5);
        assert_abs_diff_eq!(out[2], 0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_clamps_out_of_domain() {
        let lut = Lut3D::identity(9);
        assert_eq!(lut.apply([-1.0, 2.0, f32::NAN]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_from_data_wrong_len() {
        let data = vec![[0.0; 3]; 7];
        assert!(matches!(Lut3D::from_data(data, 2), Err(LutError::InvalidSize(_))));
    }

    #[test]
    fn test_index_is_red_fastest() {
        let lut = Lut3D::identity(3);
        assert_eq!(lut.data[1], [0.5, 0.0, 0.0]);
        assert_eq!(lut.data[3], [0.0, 0.5, 0.0]);
        assert_eq!(lut.data[9], [0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_hand_built_tables_do_not_index_out_of_range() {
        let constant = Lut3D {
            data: vec![[0.5; 3]],
            size: 1,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            interpolation: Interpolation::Linear,
        };
        for interp in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Tetrahedral] {
            let lut = constant.clone().with_interpolation(interp);
            assert_eq!(lut.apply([0.9, 0.1, 0.4]), [0.5; 3]);
        }

        let empty = Lut3D { data: Vec::new(), size: 0, ..constant.clone() };
        assert_eq!(empty.apply([0.2, 0.3, 0.4]), [0.2, 0.3, 0.4]);

        let short = Lut3D { data: vec![[0.0; 3]; 7], size: 2, ..constant };
        assert_eq!(short.apply([0.2, 0.3, 0.4]), [0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_domain() {
        let lut = Lut3D::identity(17).with_domain([0.0; 3], [2.0; 3]);
        let out = lut.apply([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-5);
    }
}
