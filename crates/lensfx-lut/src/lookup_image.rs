//! Tiled lookup images.
//!
//! A lookup image stores a 3D LUT as a square picture of blue slices laid
//! out in a grid. The common 512x512 variant holds 64 levels per channel in
//! 8x8 tiles of 64x64 pixels:
//!
//! ```text
//!  ┌────┬────┬─────┬────┐
//!  │b=0 │b=1 │ ... │b=7 │   inside a tile: x = red level
//!  ├────┼────┼─────┼────┤                  y = green level
//!  │b=8 │    │     │    │
//!  ├────┼────┼─────┼────┤
//!  │... │    │     │b=63│
//!  └────┴────┴─────┴────┘
//! ```
//!
//! Any square side `S` with `S^2 = n^3` and `S % n == 0` works
//! (64x64 with 16 levels, 4096x4096 with 256 levels).
//!
//! # Example
//!
//! ```rust
//! use lensfx_lut::lookup_image;
//!
//! let img = lookup_image::identity_image(16).unwrap();
//! assert_eq!((img.width(), img.height()), (64, 64));
//! let lut = lookup_image::from_image(&img).unwrap();
//! assert_eq!(lut.size, 16);
//! ```

use crate::{Lut3D, LutError, LutResult};
use lensfx_core::Image;
use tracing::debug;

/// Geometry of a tiled lookup image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    /// Levels per channel (LUT size)
    pub levels: u32,
    /// Tiles per row and per column
    pub tiles_per_row: u32,
}

impl TileLayout {
    /// Layout for a LUT with `levels` grid points per axis.
    ///
    /// Returns `None` unless `levels` is a perfect square, which is what
    /// makes the tile grid square.
    pub fn for_levels(levels: u32) -> Option<Self> {
        let t = (levels as f64).sqrt().round() as u32;
        (levels >= 2 && t * t == levels).then_some(Self { levels, tiles_per_row: t })
    }

    /// Detects the layout from image dimensions.
    pub fn detect(width: u32, height: u32) -> LutResult<Self> {
        let invalid = |reason: &str| LutError::InvalidLookupImage {
            width,
            height,
            reason: reason.to_string(),
        };
        if width != height {
            return Err(invalid("image is not square"));
        }
        let area = width as u64 * height as u64;
        let levels = (area as f64).cbrt().round() as u64;
        if levels < 2 || levels * levels * levels != area || width as u64 % levels != 0 {
            return Err(invalid("side^2 is not a cube of the level count"));
        }
        Ok(Self { levels: levels as u32, tiles_per_row: width / levels as u32 })
    }

    /// Side length of the image in pixels.
    #[inline]
    pub fn side(&self) -> u32 {
        self.levels * self.tiles_per_row
    }

    /// Pixel holding grid point (r, g, b).
    #[inline]
    pub fn pixel_of(&self, r: u32, g: u32, b: u32) -> (u32, u32) {
        let tx = b % self.tiles_per_row;
        let ty = b / self.tiles_per_row;
        (tx * self.levels + r, ty * self.levels + g)
    }
}

/// Converts a lookup image into a [`Lut3D`].
///
/// Gray and alpha channels are handled through RGBA expansion; alpha is
/// ignored.
pub fn from_image(img: &Image) -> LutResult<Lut3D> {
    let layout = TileLayout::detect(img.width(), img.height())?;
    let n = layout.levels;
    let mut data = Vec::with_capacity((n * n * n) as usize);
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                let (x, y) = layout.pixel_of(r, g, b);
                let px = img.pixel_rgba(x, y);
                data.push([px[0], px[1], px[2]]);
            }
        }
    }
    debug!(levels = n, tiles = layout.tiles_per_row, "decoded lookup image");
    Lut3D::from_data(data, n as usize)
}

/// Renders a [`Lut3D`] as a lookup image with `levels` levels.
///
/// When `levels` differs from the LUT size the LUT is resampled with its own
/// interpolation.
pub fn to_image(lut: &Lut3D, levels: u32) -> LutResult<Image> {
    let layout = TileLayout::for_levels(levels).ok_or_else(|| {
        LutError::InvalidSize(format!("{levels} levels do not form a square tile grid"))
    })?;
    let side = layout.side();
    let mut img = Image::new(side, side, 3)?;
    let n1 = (levels - 1) as f32;
    let same_grid = lut.size == levels as usize
        && lut.domain_min == [0.0; 3]
        && lut.domain_max == [1.0; 3];

    for b in 0..levels {
        for g in 0..levels {
            for r in 0..levels {
                let rgb = if same_grid {
                    lut.get(r as usize, g as usize, b as usize)
                } else {
                    let input = [r as f32 / n1, g as f32 / n1, b as f32 / n1];
                    let lo = lut.domain_min;
                    let hi = lut.domain_max;
                    lut.apply([
                        lo[0] + input[0] * (hi[0] - lo[0]),
                        lo[1] + input[1] * (hi[1] - lo[1]),
                        lo[2] + input[2] * (hi[2] - lo[2]),
                    ])
                };
                let (x, y) = layout.pixel_of(r, g, b);
                img.set_pixel(x, y, &rgb)?;
            }
        }
    }
    Ok(img)
}

/// Identity lookup image with `levels` levels (64 gives the usual 512x512).
pub fn identity_image(levels: u32) -> LutResult<Image> {
    if TileLayout::for_levels(levels).is_none() {
        return Err(LutError::InvalidSize(format!(
            "{levels} levels do not form a square tile grid"
        )));
    }
    to_image(&Lut3D::identity(levels as usize), levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_detect_standard_sizes() {
        assert_eq!(
            TileLayout::detect(512, 512).unwrap(),
            TileLayout { levels: 64, tiles_per_row: 8 }
        );
        assert_eq!(
            TileLayout::detect(64, 64).unwrap(),
            TileLayout { levels: 16, tiles_per_row: 4 }
        );
    }

    #[test]
    fn test_detect_rejects() {
        assert!(TileLayout::detect(512, 256).is_err());
        assert!(TileLayout::detect(500, 500).is_err());
    }

    #[test]
    fn test_pixel_of() {
        let layout = TileLayout { levels: 64, tiles_per_row: 8 };
        assert_eq!(layout.pixel_of(0, 0, 0), (0, 0));
        assert_eq!(layout.pixel_of(63, 63, 63), (511, 511));
        assert_eq!(layout.pixel_of(5, 7, 9), (64 + 5, 64 + 7));
    }

    #[test]
    fn test_identity_image_decodes_to_identity() {
        let img = identity_image(16).unwrap();
        let lut = from_image(&img).unwrap();
        let out = lut.apply([0.2, 0.6, 0.9]);
        assert_abs_diff_eq!(out[0], 0.2, epsilon = 1e-5);
        assert_abs_diff_eq!(out[1], 0.6, epsilon = 1e-5);
        assert_abs_diff_eq!(out[2], 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_to_image_resamples() {
        let lut = Lut3D::from_fn(5, |[r, g, b]| [1.0 - r, g, b]);
        let img = to_image(&lut, 4).unwrap();
        assert_eq!(img.width(), 8);
        // r level 3 of 4 is input 1.0, inverted to 0
        let (x, y) = TileLayout::for_levels(4).unwrap().pixel_of(3, 0, 0);
        assert_abs_diff_eq!(img.pixel(x, y)[0], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bad_levels() {
        assert!(identity_image(10).is_err());
    }
}
