//! Vibrance.
//!
//! Scales each pixel by `(1 - max + min) * vibrance + 1`, where `max` and
//! `min` are its largest and smallest color channels, then clamps to
//! `[0, 1]`. Muted pixels get the biggest push.

use lensfx_core::Image;

use crate::filter::Filter;
use crate::parallel::for_each_row;
use crate::OpsResult;

/// Default strength.
pub const DEFAULT_VIBRANCE: f32 = 1.5;

/// Gain for a pixel with the given channel extremes.
#[inline]
pub fn vibrance_gain(max: f32, min: f32, vibrance: f32) -> f32 {
    (1.0 - max + min) * vibrance + 1.0
}

/// Applies vibrance. Alpha is kept; gray images use their single value as
/// both extremes.
pub fn vibrance(img: &Image, amount: f32) -> Image {
    let ch = img.channels() as usize;
    let color = if ch >= 3 { 3 } else { 1 };
    let mut out = img.clone();
    for_each_row(out.data_mut(), img.width() as usize * ch, |_, row| {
        for px in row.chunks_exact_mut(ch) {
            let rgb = &mut px[..color];
            let max = rgb.iter().copied().fold(f32::MIN, f32::max);
            let min = rgb.iter().copied().fold(f32::MAX, f32::min);
            let gain = vibrance_gain(max, min, amount);
            rgb.iter_mut().for_each(|v| *v = (*v * gain).clamp(0.0, 1.0));
        }
    });
    out
}

/// Vibrance filter.
#[derive(Debug, Clone)]
pub struct Vibrance {
    /// Source image.
    pub input: Option<Image>,
    /// Strength; 0 leaves the image unchanged.
    pub amount: f32,
}

impl Default for Vibrance {
    fn default() -> Self {
        Self { input: None, amount: DEFAULT_VIBRANCE }
    }
}

impl Filter for Vibrance {
    fn name(&self) -> &'static str {
        "Vibrance"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        Ok(self.input.as_ref().map(|img| vibrance(img, self.amount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gain() {
        assert_eq!(vibrance_gain(1.0, 0.0, 1.5), 1.0);
        assert_abs_diff_eq!(vibrance_gain(0.5, 0.5, 1.5), 2.5);
    }

    #[test]
    fn test_vibrance_values() {
        let img = Image::from_data(2, 1, 4, vec![1.0, 0.0, 0.0, 0.3, 0.2, 0.1, 0.1, 1.0]).unwrap();
        let out = vibrance(&img, 1.5);
        // Fully saturated red is unchanged
        assert_eq!(out.pixel(0, 0), &[1.0, 0.0, 0.0, 0.3]);
        // (1 - 0.2 + 0.1) * 1.5 + 1 = 2.35
        let p = out.pixel(1, 0);
        assert_abs_diff_eq!(p[0], 0.47, epsilon = 1e-5);
        assert_abs_diff_eq!(p[1], 0.235, epsilon = 1e-5);
        assert_eq!(p[3], 1.0);
    }

    #[test]
    fn test_clamps() {
        let img = Image::filled(1, 1, &[0.6, 0.6, 0.6]).unwrap();
        assert_eq!(vibrance(&img, 1.5).pixel(0, 0), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_zero_amount_identity() {
        let img = Image::filled(3, 3, &[0.2, 0.5, 0.7, 1.0]).unwrap();
        let f = Vibrance { input: Some(img.clone()), amount: 0.0 };
        assert_eq!(f.output_image().unwrap().unwrap(), img);
    }
}
