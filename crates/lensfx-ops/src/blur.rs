//! Gaussian and box blur.
//!
//! Both blurs are separable: a horizontal pass over rows, then the same pass
//! over the transposed buffer for the vertical direction. Edges repeat the
//! border pixel.
//!
//! # Example
//!
//! ```rust
//! use lensfx_core::Image;
//! use lensfx_ops::blur::gaussian_blur;
//!
//! let img = Image::filled(32, 32, &[0.5, 0.5, 0.5, 1.0]).unwrap();
//! let soft = gaussian_blur(&img, 2.0).unwrap();
//! assert!((soft.pixel(16, 16)[0] - 0.5).abs() < 1e-5);
//! ```

use lensfx_core::Image;
use tracing::trace;

use crate::filter::Filter;
use crate::parallel::{for_each_row, transpose};
use crate::{OpsError, OpsResult};

/// Normalized 1D Gaussian with radius `ceil(3 * sigma)`.
///
/// ```rust
/// use lensfx_ops::blur::gaussian_kernel_1d;
///
/// let k = gaussian_kernel_1d(1.0);
/// assert_eq!(k.len(), 7);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
/// ```
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as usize;
    gaussian_kernel_sized(2 * radius + 1, sigma)
}

/// Normalized 1D Gaussian of a fixed odd `size`.
pub fn gaussian_kernel_sized(size: usize, sigma: f32) -> Vec<f32> {
    let size = if size % 2 == 0 { size + 1 } else { size };
    let half = (size / 2) as i32;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / two_sigma2).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    k.iter_mut().for_each(|w| *w /= sum);
    k
}

/// Sigma implied by a kernel size when none is given:
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
#[inline]
pub fn sigma_for_size(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian blur with standard deviation `sigma` in pixels.
///
/// `sigma <= 0` returns a copy.
pub fn gaussian_blur(img: &Image, sigma: f32) -> OpsResult<Image> {
    if !sigma.is_finite() {
        return Err(OpsError::InvalidParameter(format!("blur sigma {sigma}")));
    }
    separable(img, &gaussian_kernel_1d(sigma))
}

/// Gaussian blur with an explicit odd kernel size, like a 5x5 smoothing
/// step. A `sigma` of 0 derives it from the size.
pub fn gaussian_blur_sized(img: &Image, size: usize, sigma: f32) -> OpsResult<Image> {
    if size == 0 {
        return Err(OpsError::InvalidParameter("kernel size must be > 0".into()));
    }
    let sigma = if sigma > 0.0 { sigma } else { sigma_for_size(size) };
    separable(img, &gaussian_kernel_sized(size, sigma))
}

/// Box blur averaging a `(2 * radius + 1)` square window.
pub fn box_blur(img: &Image, radius: usize) -> OpsResult<Image> {
    let size = radius
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| OpsError::InvalidParameter("box radius overflows".into()))?;
    separable(img, &vec![1.0 / size as f32; size])
}

/// Convolves rows then columns with the same odd 1D kernel.
fn separable(img: &Image, kernel: &[f32]) -> OpsResult<Image> {
    if kernel.len() <= 1 {
        return Ok(img.clone());
    }
    trace!(taps = kernel.len(), "separable blur");
    let (w, h, ch) = (img.width() as usize, img.height() as usize, img.channels() as usize);

    let rows = convolve_rows(img.data(), w, h, ch, kernel);
    let cols = convolve_rows(&transpose(&rows, w, h, ch), h, w, ch, kernel);
    let data = transpose(&cols, h, w, ch);
    Ok(Image::from_data(img.width(), img.height(), img.channels(), data)?)
}

fn convolve_rows(src: &[f32], width: usize, height: usize, channels: usize, kernel: &[f32]) -> Vec<f32> {
    let half = (kernel.len() / 2) as isize;
    let last = width as isize - 1;
    let mut dst = vec![0.0f32; width * height * channels];

    for_each_row(&mut dst, width * channels, |y, row| {
        let src_row = &src[y * width * channels..(y + 1) * width * channels];
        for x in 0..width {
            let out = &mut row[x * channels..(x + 1) * channels];
            for (k, w) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, last) as usize;
                for c in 0..channels {
                    out[c] += src_row[sx * channels + c] * w;
                }
            }
        }
    });
    dst
}

/// Gaussian blur filter.
#[derive(Debug, Clone, Default)]
pub struct GaussianBlur {
    /// Source image.
    pub input: Option<Image>,
    /// Standard deviation in pixels.
    pub radius: f32,
}

impl Filter for GaussianBlur {
    fn name(&self) -> &'static str {
        "GaussianBlur"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        match &self.input {
            Some(input) => gaussian_blur(input, self.radius).map(Some),
            None => Ok(None),
        }
    }
}
