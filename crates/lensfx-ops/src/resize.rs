//! Image resampling.
//!
//! Two separable passes, horizontal then vertical, each evaluating a
//! filter kernel around the mapped source position. When shrinking, the
//! kernel is widened by the scale factor so every source pixel contributes.
//!
//! # Example
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::resize::{resize, ResampleFilter};
//!
//! let mask = Image::filled(64, 64, &[0.5]).unwrap();
//! let fitted = resize(&mask, 128, 96, ResampleFilter::Bilinear).unwrap();
//! assert_eq!((fitted.width(), fitted.height()), (128, 96));
//! ```

use std::str::FromStr;

use lensfx_core::Image;
use tracing::debug;

use crate::parallel::{for_each_row, transpose};
use crate::{OpsError, OpsResult};

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    /// Nearest neighbor.
    Nearest,
    /// Triangle.
    #[default]
    Bilinear,
    /// Mitchell-Netravali cubic (B = C = 1/3).
    Bicubic,
    /// Three-lobe windowed sinc.
    Lanczos3,
}

impl ResampleFilter {
    /// Kernel radius in source pixels at unit scale.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            ResampleFilter::Nearest => 0.5,
            ResampleFilter::Bilinear => 1.0,
            ResampleFilter::Bicubic => 2.0,
            ResampleFilter::Lanczos3 => 3.0,
        }
    }

    /// Kernel weight at distance `x`.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        let ax = x.abs();
        match self {
            ResampleFilter::Nearest => {
                if ax <= 0.5 { 1.0 } else { 0.0 }
            }
            ResampleFilter::Bilinear => (1.0 - ax).max(0.0),
            ResampleFilter::Bicubic => mitchell(ax),
            ResampleFilter::Lanczos3 => lanczos(ax, 3.0),
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "bicubic" | "cubic" | "mitchell" => Ok(Self::Bicubic),
            "lanczos" | "lanczos3" => Ok(Self::Lanczos3),
            other => Err(OpsError::InvalidParameter(format!("unknown resample filter: {other}"))),
        }
    }
}

fn mitchell(ax: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

fn lanczos(ax: f32, a: f32) -> f32 {
    if ax < 1e-8 {
        return 1.0;
    }
    if ax >= a {
        return 0.0;
    }
    let pi_x = std::f32::consts::PI * ax;
    let pi_x_a = pi_x / a;
    (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
}

/// Resizes `img` to `width x height`, keeping its channel count.
pub fn resize(img: &Image, width: u32, height: u32, filter: ResampleFilter) -> OpsResult<Image> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "cannot resize to {width}x{height}"
        )));
    }
    if img.width() == width && img.height() == height {
        return Ok(img.clone());
    }
    debug!(
        from = %format!("{}x{}", img.width(), img.height()),
        to = %format!("{width}x{height}"),
        ?filter,
        "resize"
    );

    let ch = img.channels() as usize;
    let (sw, sh) = (img.width() as usize, img.height() as usize);
    let (dw, dh) = (width as usize, height as usize);

    let horizontal = resample_rows(img.data(), sw, sh, ch, dw, filter);
    // Vertical pass runs on the transposed buffer so it is a row pass too
    let columns = transpose(&horizontal, dw, sh, ch);
    let vertical = resample_rows(&columns, sh, dw, ch, dh, filter);
    let data = transpose(&vertical, dh, dw, ch);

    Ok(Image::from_data(width, height, img.channels(), data)?)
}

/// Resamples every row of `src` from `src_w` to `dst_w` pixels.
fn resample_rows(
    src: &[f32],
    src_w: usize,
    rows: usize,
    channels: usize,
    dst_w: usize,
    filter: ResampleFilter,
) -> Vec<f32> {
    let scale = src_w as f32 / dst_w as f32;
    let stretch = scale.max(1.0);
    let support = filter.support() * stretch;
    let taps = build_taps(src_w, dst_w, scale, stretch, support, filter);

    let mut dst = vec![0.0f32; dst_w * rows * channels];
    for_each_row(&mut dst, dst_w * channels, |y, row| {
        let src_row = &src[y * src_w * channels..(y + 1) * src_w * channels];
        for (x, (left, weights)) in taps.iter().enumerate() {
            let out = &mut row[x * channels..(x + 1) * channels];
            for (i, w) in weights.iter().enumerate() {
                let s = (left + i) * channels;
                for c in 0..channels {
                    out[c] += src_row[s + c] * w;
                }
            }
        }
    });
    dst
}

/// Normalized weights per destination pixel: `(first source index, weights)`.
fn build_taps(
    src_w: usize,
    dst_w: usize,
    scale: f32,
    stretch: f32,
    support: f32,
    filter: ResampleFilter,
) -> Vec<(usize, Vec<f32>)> {
    (0..dst_w)
        .map(|x| {
            let center = (x as f32 + 0.5) * scale - 0.5;
            let left = ((center - support).floor().max(0.0)) as usize;
            let right = ((center + support).ceil().max(0.0) as usize).min(src_w - 1);
            let mut weights: Vec<f32> = (left..=right)
                .map(|sx| filter.weight((sx as f32 - center) / stretch))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() > 1e-8 {
                weights.iter_mut().for_each(|w| *w /= sum);
            } else {
                // Degenerate window: take the nearest source pixel
                let nearest = (center.round().max(0.0) as usize).clamp(left, right);
                weights.iter_mut().for_each(|w| *w = 0.0);
                weights[nearest - left] = 1.0;
            }
            (left, weights)
        })
        .collect()
}
