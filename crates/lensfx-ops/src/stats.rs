//! Image color statistics.
//!
//! Pixel pickers for white balancing and a summary report. Thresholds are
//! in 8-bit code values (0-255) since that is how they are usually quoted;
//! colors come back in `[0, 1]`.

use lensfx_core::{luminance_rec709, Image, Rect};
use tracing::{debug, trace};

use crate::cct;
use crate::filter::Filter;
use crate::{OpsError, OpsResult};

/// Rec.601 luma weights used by the highlight and white point pickers.
pub const REC601_LUMA: [f32; 3] = [0.2989, 0.5870, 0.1140];

#[inline]
fn luma601(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC601_LUMA[0] + rgb[1] * REC601_LUMA[1] + rgb[2] * REC601_LUMA[2]
}

#[inline]
fn rgb_of(img: &Image, x: u32, y: u32) -> [f32; 3] {
    let p = img.pixel_rgba(x, y);
    [p[0], p[1], p[2]]
}

fn coords(img: &Image) -> impl Iterator<Item = (u32, u32)> + '_ {
    (0..img.height()).flat_map(move |y| (0..img.width()).map(move |x| (x, y)))
}

/// A chosen pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPick {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Color.
    pub rgb: [f32; 3],
}

/// Mean RGBA over `rect`, or the whole image when `None`.
pub fn area_average(img: &Image, rect: Option<Rect>) -> OpsResult<[f32; 4]> {
    let full = img.extent();
    let rect = match rect {
        Some(r) => r
            .intersect(&full)
            .ok_or_else(|| OpsError::InvalidParameter(format!("{r} lies outside {full}")))?,
        None => full,
    };
    let mut sum = [0.0f64; 4];
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let p = img.pixel_rgba(x, y);
            for c in 0..4 {
                sum[c] += p[c] as f64;
            }
        }
    }
    let n = rect.area() as f64;
    Ok(sum.map(|s| (s / n) as f32))
}

/// Thresholds for [`highlight_average`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightOptions {
    /// Minimum luma of a highlight.
    pub threshold: f32,
    /// Pixels with every channel at or above this are clipped white.
    pub white: f32,
    /// Luma at or below this is ignored.
    pub dark: f32,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self { threshold: 200.0, white: 254.0, dark: 20.0 }
    }
}

/// Mean color of the highlights, skipping clipped white and very dark
/// pixels. `None` when nothing qualifies.
pub fn highlight_average(img: &Image, opts: HighlightOptions) -> Option<[f32; 3]> {
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for (x, y) in coords(img) {
        let rgb = rgb_of(img, x, y);
        let luma = luma601(rgb) * 255.0;
        let clipped = rgb.iter().all(|&v| v * 255.0 >= opts.white);
        if luma >= opts.threshold && !clipped && luma > opts.dark {
            for c in 0..3 {
                sum[c] += rgb[c] as f64;
            }
            count += 1;
        }
    }
    trace!(count, "highlight pixels");
    (count > 0).then(|| sum.map(|s| (s / count as f64) as f32))
}

/// Brightest pixel that is not pure white, among those with luma of at
/// least `threshold`. Brightness is the channel sum.
pub fn max_white_point(img: &Image, threshold: f32) -> Option<PixelPick> {
    coords(img)
        .map(|(x, y)| PixelPick { x, y, rgb: rgb_of(img, x, y) })
        .filter(|p| luma601(p.rgb) * 255.0 >= threshold && p.rgb.iter().any(|&v| v < 1.0))
        .fold(None, |best: Option<PixelPick>, p| match best {
            Some(b) if b.rgb.iter().sum::<f32>() >= p.rgb.iter().sum::<f32>() => Some(b),
            _ => Some(p),
        })
}

/// Pixel with the largest single channel; the first one wins ties.
pub fn brightest_point(img: &Image) -> PixelPick {
    let max_of = |p: &PixelPick| p.rgb.iter().copied().fold(f32::MIN, f32::max);
    coords(img)
        .map(|(x, y)| PixelPick { x, y, rgb: rgb_of(img, x, y) })
        .fold(None, |best: Option<PixelPick>, p| match best {
            Some(b) if max_of(&b) >= max_of(&p) => Some(b),
            _ => Some(p),
        })
        .unwrap_or(PixelPick { x: 0, y: 0, rgb: rgb_of(img, 0, 0) })
}

/// Pixel closest to white by RGB distance.
pub fn neutral_point(img: &Image) -> PixelPick {
    let dist = |p: &PixelPick| p.rgb.iter().map(|&v| (1.0 - v) * (1.0 - v)).sum::<f32>();
    coords(img)
        .map(|(x, y)| PixelPick { x, y, rgb: rgb_of(img, x, y) })
        .fold(None, |best: Option<PixelPick>, p| match best {
            Some(b) if dist(&b) <= dist(&p) => Some(b),
            _ => Some(p),
        })
        .unwrap_or(PixelPick { x: 0, y: 0, rgb: rgb_of(img, 0, 0) })
}

/// White reference for balancing: the pixel whose Rec.709 luminance is
/// within `threshold` of 255 and closest to it, else pure white.
pub fn white_balance_point(img: &Image, threshold: f32) -> [f32; 3] {
    coords(img)
        .map(|(x, y)| rgb_of(img, x, y))
        .map(|rgb| ((luminance_rec709(rgb) * 255.0 - 255.0).abs(), rgb))
        .filter(|(diff, _)| *diff < threshold)
        .fold(None, |best: Option<(f32, [f32; 3])>, cand| match best {
            Some(b) if b.0 <= cand.0 => Some(b),
            _ => Some(cand),
        })
        .map_or([1.0; 3], |(_, rgb)| rgb)
}

/// Summary of an image's color balance.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorReport {
    /// Mean RGBA.
    pub average: [f32; 4],
    /// McCamy CCT of the mean color.
    pub temperature: Option<f32>,
    /// Empirical offset from 6500 K of the mean color.
    pub kelvin_offset: i32,
    /// Red/blue tint of the mean color.
    pub tint: f32,
    /// Mean highlight color.
    pub highlight: Option<[f32; 3]>,
    /// CCT of the highlight color.
    pub highlight_temperature: Option<f32>,
    /// Largest-channel pixel.
    pub brightest: PixelPick,
    /// Closest-to-white pixel.
    pub neutral: PixelPick,
    /// Brightest non-clipped near-white pixel.
    pub max_white: Option<PixelPick>,
}

/// Gathers every statistic in this module.
pub fn color_report(img: &Image) -> OpsResult<ColorReport> {
    let average = area_average(img, None)?;
    let avg_rgb = [average[0], average[1], average[2]];
    let highlight = highlight_average(img, HighlightOptions::default());
    let report = ColorReport {
        average,
        temperature: cct::color_temperature(avg_rgb),
        kelvin_offset: cct::kelvin_offset(avg_rgb),
        tint: cct::tint(avg_rgb),
        highlight,
        highlight_temperature: highlight.and_then(cct::color_temperature),
        brightest: brightest_point(img),
        neutral: neutral_point(img),
        max_white: max_white_point(img, 240.0),
    };
    debug!(temperature = ?report.temperature, kelvin_offset = report.kelvin_offset, "color report");
    Ok(report)
}

/// Average color as a 1x1 RGBA image.
#[derive(Debug, Clone, Default)]
pub struct AreaAverage {
    /// Source image.
    pub input: Option<Image>,
    /// Region to average; the whole image when `None`.
    pub extent: Option<Rect>,
}

impl Filter for AreaAverage {
    fn name(&self) -> &'static str {
        "AreaAverage"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        let avg = area_average(input, self.extent)?;
        Ok(Some(Image::from_data(1, 1, 4, avg.to_vec())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn from_u8(w: u32, h: u32, px: &[[u8; 3]]) -> Image {
        let data = px.iter().flatten().map(|&v| v as f32 / 255.0).collect();
        Image::from_data(w, h, 3, data).unwrap()
    }

    #[test]
    fn test_area_average() {
        let img = Image::from_data(2, 1, 4, vec![0.0, 0.2, 0.4, 1.0, 1.0, 0.4, 0.0, 0.0]).unwrap();
        let avg = area_average(&img, None).unwrap();
        assert_abs_diff_eq!(avg[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(avg[1], 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(avg[3], 0.5, epsilon = 1e-6);

        let right = area_average(&img, Some(Rect::new(1, 0, 5, 5))).unwrap();
        assert_abs_diff_eq!(right[0], 1.0);
        assert!(area_average(&img, Some(Rect::new(4, 4, 1, 1))).is_err());
    }

    #[test]
    fn test_area_average_filter() {
        let img = Image::filled(4, 4, &[0.25]).unwrap();
        let f = AreaAverage { input: Some(img), extent: None };
        let out = f.output_image().unwrap().unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (1, 1, 4));
        assert_abs_diff_eq!(out.pixel(0, 0)[2], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_highlight_average() {
        let img = from_u8(4, 1, &[[255, 255, 255], [230, 220, 210], [210, 220, 230], [10, 10, 10]]);
        let hl = highlight_average(&img, HighlightOptions::default()).unwrap();
        assert_abs_diff_eq!(hl[0] * 255.0, 220.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hl[1] * 255.0, 220.0, epsilon = 1e-3);

        let dark = from_u8(1, 1, &[[40, 40, 40]]);
        assert!(highlight_average(&dark, HighlightOptions::default()).is_none());
    }

    #[test]
    fn test_pickers() {
        let img = from_u8(3, 1, &[[255, 255, 255], [250, 245, 240], [0, 0, 255]]);

        let mw = max_white_point(&img, 240.0).unwrap();
        assert_eq!((mw.x, mw.y), (1, 0));

        // Pure white wins on channel max; first pixel breaks the tie with blue
        assert_eq!(brightest_point(&img).x, 0);
        assert_eq!(neutral_point(&img).x, 0);

        let wb = white_balance_point(&img, 10.0);
        assert_eq!(wb, [1.0, 1.0, 1.0]);
        let off_white = from_u8(2, 1, &[[250, 250, 250], [100, 100, 100]]);
        assert_abs_diff_eq!(white_balance_point(&off_white, 10.0)[0], 250.0 / 255.0);
        assert_eq!(white_balance_point(&from_u8(1, 1, &[[10, 10, 10]]), 10.0), [1.0; 3]);
    }

    #[test]
    fn test_report() {
        let img = from_u8(2, 2, &[[200, 180, 160], [250, 240, 230], [30, 30, 30], [128, 128, 128]]);
        let report = color_report(&img).unwrap();
        assert!(report.temperature.is_some());
        assert!(report.tint > 0.0);
        assert_eq!(report.brightest.x, 1);
        assert_eq!(report.neutral.rgb, report.brightest.rgb);
        assert!(report.highlight.is_some());
    }
}
