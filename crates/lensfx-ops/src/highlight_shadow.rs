//! Highlight and shadow adjustment.
//!
//! A luminance mask, optionally blurred by `radius`, decides how much each
//! pixel counts as shadow or highlight. Shadows are lifted by
//! `shadow_amount * (1 - mask)^2` and highlights pulled down by
//! `(1 - highlight_amount) * mask^2`, both scaled by `L * (1 - L)` so black
//! and white stay put. Color is scaled by the luminance ratio, which keeps
//! hue. `highlight_amount = 1` and `shadow_amount = 0` leave the image
//! unchanged.

use lensfx_core::{luminance_rec709, Image};
use tracing::debug;

use crate::blur::gaussian_blur;
use crate::filter::Filter;
use crate::parallel::for_each_row;
use crate::OpsResult;

/// New luminance for pixel luminance `l` given the blurred mask value `m`.
pub fn adjust_luminance(l: f32, m: f32, highlight: f32, shadow: f32) -> f32 {
    let m = m.clamp(0.0, 1.0);
    let shade = 1.0 - m;
    let lifted = l + shadow * shade * shade * l * (1.0 - l) * 2.0;
    lifted - (1.0 - highlight) * m * m * lifted * (1.0 - lifted) * 2.0
}

/// Applies the adjustment. `highlight` is clamped to `[0, 1]`, `shadow` to
/// `[-1, 1]`.
pub fn highlight_shadow(img: &Image, highlight: f32, shadow: f32, radius: f32) -> OpsResult<Image> {
    let highlight = highlight.clamp(0.0, 1.0);
    let shadow = shadow.clamp(-1.0, 1.0);
    if highlight == 1.0 && shadow == 0.0 {
        return Ok(img.clone());
    }
    debug!(highlight, shadow, radius, "highlight/shadow");

    let luma = img.with_channels(1)?;
    let mask = if radius > 0.0 { gaussian_blur(&luma, radius)? } else { luma.clone() };

    let ch = img.channels() as usize;
    let color = if ch >= 3 { 3 } else { 1 };
    let width = img.width() as usize;
    let src = img.data();
    let (l_data, m_data) = (luma.data(), mask.data());

    let mut out = img.clone();
    for_each_row(out.data_mut(), width * ch, |y, row| {
        for x in 0..width {
            let i = y * width + x;
            let l = l_data[i];
            if l <= 1e-6 {
                continue;
            }
            let ratio = adjust_luminance(l, m_data[i], highlight, shadow) / l;
            let px = &mut row[x * ch..x * ch + color];
            for (c, v) in px.iter_mut().enumerate() {
                *v = src[i * ch + c] * ratio;
            }
        }
    });
    Ok(out)
}

/// Highlight/shadow filter.
#[derive(Debug, Clone)]
pub struct HighlightShadowAdjust {
    /// Source image.
    pub input: Option<Image>,
    /// Mask blur in pixels; 0 uses per-pixel luminance.
    pub radius: f32,
    /// 1 keeps highlights, lower values darken them.
    pub highlight_amount: f32,
    /// 0 keeps shadows, positive values lift them.
    pub shadow_amount: f32,
}

impl Default for HighlightShadowAdjust {
    fn default() -> Self {
        Self { input: None, radius: 0.0, highlight_amount: 1.0, shadow_amount: 0.0 }
    }
}

impl Filter for HighlightShadowAdjust {
    fn name(&self) -> &'static str {
        "HighlightShadowAdjust"
    }

    fn output_image(&self) -> OpsResult<Option<Image>> {
        match &self.input {
            Some(input) => {
                highlight_shadow(input, self.highlight_amount, self.shadow_amount, self.radius).map(Some)
            }
            None => Ok(None),
        }
    }
}
