//! Demo recipes.
//!
//! A recipe names an input image, an optional mask and lookup table, and a
//! list of steps. Names resolve next to the recipe file.
//!
//! ```yaml
//! input: input.webp
//! mask: mask.png
//! lookup: lookup.png
//! steps:
//!   - effect: gaussian-blur
//!     radius: 2
//!     output: gas.png
//!   - effect: lens-blur
//!     radius: 12
//!     output: bokeh.jpg
//!   - effect: average
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A list of filter steps over one input image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Source image.
    #[serde(default = "default_input")]
    pub input: String,
    /// Depth mask for `lens-blur` steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// Lookup image or `.cube` file for `lookup` steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<String>,
    /// Steps, run in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_input() -> String {
    "input.webp".to_string()
}

/// One effect and where its result goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Output file; its extension picks the format. Analysis steps print
    /// instead and ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Apply to the previous step's result instead of the input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub chain: bool,
    /// The effect and its parameters.
    #[serde(flatten)]
    pub effect: Effect,
}

/// Effects a step can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum Effect {
    /// Gaussian blur.
    GaussianBlur(GaussianBlurParams),
    /// Highlight and shadow adjust.
    HighlightShadow(HighlightShadowParams),
    /// Chromatic aberration.
    Prism(PrismParams),
    /// Barrel distortion correction.
    AntiFisheye(AntiFisheyeParams),
    /// Mask-driven bokeh; needs the recipe mask.
    LensBlur(LensBlurParams),
    /// Color lookup; needs the recipe lookup table.
    Lookup(LookupParams),
    /// Rotational blur.
    SpinBlur(SpinBlurParams),
    /// Vibrance.
    Vibrance(VibranceParams),
    /// Prints the average color.
    Average(AverageParams),
    /// Prints the color temperature report.
    Cct,
}

impl Effect {
    /// Name used in logs and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::GaussianBlur(_) => "gaussian-blur",
            Effect::HighlightShadow(_) => "highlight-shadow",
            Effect::Prism(_) => "prism",
            Effect::AntiFisheye(_) => "anti-fisheye",
            Effect::LensBlur(_) => "lens-blur",
            Effect::Lookup(_) => "lookup",
            Effect::SpinBlur(_) => "spin-blur",
            Effect::Vibrance(_) => "vibrance",
            Effect::Average(_) => "average",
            Effect::Cct => "cct",
        }
    }

    /// True for steps that print rather than write an image.
    pub fn is_analysis(&self) -> bool {
        matches!(self, Effect::Average(_) | Effect::Cct)
    }
}

/// Gaussian blur parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianBlurParams {
    /// Sigma in pixels.
    pub radius: f32,
    /// Fixed odd kernel size; `radius` is then the sigma of that kernel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl Default for GaussianBlurParams {
    fn default() -> Self {
        Self { radius: 2.0, size: None }
    }
}

/// Highlight/shadow parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightShadowParams {
    /// 1 leaves highlights unchanged.
    pub highlight: f32,
    /// 0 leaves shadows unchanged.
    pub shadow: f32,
    /// Luminance mask blur.
    pub radius: f32,
}

impl Default for HighlightShadowParams {
    fn default() -> Self {
        Self { highlight: 1.0, shadow: 0.0, radius: 0.0 }
    }
}

/// Prism parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismParams {
    pub distortion: f32,
    pub iterations: f32,
    pub strength: f32,
    pub separation: f32,
}

impl Default for PrismParams {
    fn default() -> Self {
        Self { distortion: 0.0, iterations: 5.0, strength: 0.5, separation: 0.5 }
    }
}

/// Anti-fisheye parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiFisheyeParams {
    pub factor: f32,
}

impl Default for AntiFisheyeParams {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

/// Lens blur parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensBlurParams {
    pub radius: f32,
    pub brightness: f32,
    pub angle: f32,
}

impl Default for LensBlurParams {
    fn default() -> Self {
        Self { radius: 10.0, brightness: 0.5, angle: 0.0 }
    }
}

/// Color lookup parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupParams {
    pub intensity: f32,
}

impl Default for LookupParams {
    fn default() -> Self {
        Self { intensity: 1.0 }
    }
}

/// Spin blur parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinBlurParams {
    pub steps: u32,
    pub delta: f32,
    pub smooth: usize,
}

impl Default for SpinBlurParams {
    fn default() -> Self {
        use lensfx_ops::spin_blur::{DEFAULT_DELTA, DEFAULT_SMOOTH, DEFAULT_STEPS};
        Self { steps: DEFAULT_STEPS, delta: DEFAULT_DELTA, smooth: DEFAULT_SMOOTH }
    }
}

/// Vibrance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibranceParams {
    pub amount: f32,
}

impl Default for VibranceParams {
    fn default() -> Self {
        Self { amount: lensfx_ops::vibrance::DEFAULT_VIBRANCE }
    }
}

/// Average readback parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AverageParams {
    /// `[x, y, width, height]`; the whole image when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<[u32; 4]>,
}

impl Recipe {
    /// Parses YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid recipe")
    }

    /// Loads a recipe file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("In {}", path.display()))
    }

    /// YAML text of this recipe.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize recipe")
    }

    /// The stock demo: the two adjustment renders, then one render per lens
    /// filter and an average readback.
    pub fn builtin() -> Self {
        let step = |output: &str, effect| Step { output: Some(output.to_string()), chain: false, effect };
        Self {
            input: default_input(),
            mask: Some("mask.png".to_string()),
            lookup: Some("lookup.png".to_string()),
            steps: vec![
                step("gas.png", Effect::GaussianBlur(GaussianBlurParams { radius: 2.0, size: None })),
                step(
                    "hsa.png",
                    Effect::HighlightShadow(HighlightShadowParams { highlight: 1.0, shadow: 0.4, radius: 0.0 }),
                ),
                step(
                    "prism.png",
                    Effect::Prism(PrismParams { distortion: 0.05, ..Default::default() }),
                ),
                step("antifisheye.png", Effect::AntiFisheye(AntiFisheyeParams { factor: 1.2 })),
                step("lensblur.jpg", Effect::LensBlur(LensBlurParams::default())),
                step("lookup.tiff", Effect::Lookup(LookupParams::default())),
                Step { output: None, chain: false, effect: Effect::Average(AverageParams::default()) },
            ],
        }
    }
}
