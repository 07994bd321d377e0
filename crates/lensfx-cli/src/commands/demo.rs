//! Demo command
//!
//! Runs a [`Recipe`]: loads the input once, then renders each step and
//! writes it under the output directory. A missing input stops the run with
//! a message; a missing mask or lookup table, or an output extension no
//! writer handles, skips that step.

use crate::recipe::{Effect, Recipe, Step};
use crate::DemoArgs;
use anyhow::{Context, Result};
use lensfx_core::{Image, Rect};
use lensfx_io::Format;
use lensfx_ops::blur::gaussian_blur_sized;
use lensfx_ops::stats::color_report;
use lensfx_ops::{
    AntiFishEye, GaussianBlur, HighlightShadowAdjust, LensBlur, Prism, SpinBlur, Vibrance,
};
use std::path::{Path, PathBuf};
use tracing::{info, trace, warn};

/// What happened to one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Image written.
    Written(PathBuf),
    /// Analysis printed.
    Printed(String),
    /// Step did not run.
    Skipped(String),
}

/// Everything a run did, in step order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoReport {
    /// Per-step outcomes.
    pub steps: Vec<StepOutcome>,
}

impl DemoReport {
    /// Paths written.
    pub fn written(&self) -> Vec<&Path> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                StepOutcome::Written(p) => Some(p.as_path()),
                _ => None,
            })
            .collect()
    }
}

/// Loads an optional side input. Failure is reported and yields `None`.
fn load_optional(base_dir: &Path, name: Option<&str>, what: &str) -> Option<Image> {
    let name = name?;
    match super::load_image_relative(base_dir, name) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(what, error = %format!("{e:#}"), "side input unavailable");
            None
        }
    }
}

/// Side inputs shared by all steps.
struct Inputs {
    image: Image,
    mask: Option<Image>,
    lookup: Option<lensfx_ops::ColorLookup>,
}

fn load_lookup(base_dir: &Path, name: Option<&str>) -> Option<lensfx_ops::ColorLookup> {
    let name = name?;
    let path = lensfx_io::resolve_relative(base_dir, name);
    match super::lookup::lookup_filter(&path, 1.0, Default::default()) {
        Ok(filter) => Some(filter),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "lookup table unavailable");
            None
        }
    }
}

/// Renders one image-producing effect. `Ok(None)` when a side input the
/// effect needs is missing. Lens blur needs its mask only for a positive
/// radius.
fn render_effect(effect: &Effect, source: &Image, inputs: &Inputs) -> Result<Option<Image>> {
    let input = Some(source.clone());
    let image = match effect {
        Effect::GaussianBlur(p) => match p.size {
            Some(size) => gaussian_blur_sized(source, size, p.radius)?,
            None => super::render(&GaussianBlur { input, radius: p.radius })?,
        },
        Effect::HighlightShadow(p) => super::render(&HighlightShadowAdjust {
            input,
            radius: p.radius,
            highlight_amount: p.highlight,
            shadow_amount: p.shadow,
        })?,
        Effect::Prism(p) => super::render(&Prism {
            input,
            distortion: p.distortion,
            iterations: p.iterations,
            strength: p.strength,
            separation: p.separation,
        })?,
        Effect::AntiFisheye(p) => super::render(&AntiFishEye { input, factor: p.factor })?,
        Effect::LensBlur(p) => {
            if p.radius > 0.0 && inputs.mask.is_none() {
                return Ok(None);
            }
            super::render(&LensBlur {
                input,
                mask: inputs.mask.clone(),
                radius: p.radius,
                brightness: p.brightness,
                angle: p.angle,
            })?
        }
        Effect::Lookup(p) => {
            let Some(lookup) = &inputs.lookup else {
                return Ok(None);
            };
            let filter = lensfx_ops::ColorLookup { input, intensity: p.intensity, ..lookup.clone() };
            super::render(&filter)?
        }
        Effect::SpinBlur(p) => {
            super::render(&SpinBlur { input, steps: p.steps, delta: p.delta, smooth: p.smooth })?
        }
        Effect::Vibrance(p) => super::render(&Vibrance { input, amount: p.amount })?,
        Effect::Average(_) | Effect::Cct => return Ok(None),
    };
    Ok(Some(image))
}

fn analyze(effect: &Effect, source: &Image) -> Result<String> {
    match effect {
        Effect::Average(p) => {
            let rect = p.rect.map(|[x, y, w, h]| Rect::new(x, y, w, h));
            let rgba = super::analyze::average_color(source.clone(), rect)?;
            Ok(super::analyze::format_average(rgba))
        }
        Effect::Cct => Ok(super::analyze::format_report(&color_report(source)?)),
        other => Ok(format!("{} is not an analysis step", other.name())),
    }
}

/// Runs one step; the rendered image comes back for chaining.
fn run_step(
    step: &Step,
    source: &Image,
    inputs: &Inputs,
    out_dir: &Path,
) -> Result<(StepOutcome, Option<Image>)> {
    let name = step.effect.name();
    trace!(effect = name, output = ?step.output, "demo::run_step");

    if step.effect.is_analysis() {
        let text = analyze(&step.effect, source)?;
        println!("{text}");
        return Ok((StepOutcome::Printed(text), None));
    }

    let Some(output) = &step.output else {
        return Ok((StepOutcome::Skipped(format!("{name}: no output file")), None));
    };
    let path = lensfx_io::resolve_relative(out_dir, output);
    if Format::from_extension(&path) == Format::Unknown {
        return Ok((StepOutcome::Skipped(format!("{name}: unsupported format {output}")), None));
    }

    info!(effect = name, output = %path.display(), "Rendering");
    match render_effect(&step.effect, source, inputs)? {
        Some(image) => {
            super::save_image(&path, &image)?;
            Ok((StepOutcome::Written(path), Some(image)))
        }
        None => {
            let missing = match step.effect {
                Effect::LensBlur(_) => "mask",
                _ => "lookup table",
            };
            Ok((StepOutcome::Skipped(format!("{name}: no {missing}")), None))
        }
    }
}

/// Runs every step of `recipe`. Names in the recipe resolve against
/// `base_dir`; outputs land in `out_dir`.
pub fn run_recipe(recipe: &Recipe, base_dir: &Path, out_dir: &Path) -> Result<DemoReport> {
    trace!(base = %base_dir.display(), out = %out_dir.display(), steps = recipe.steps.len(), "demo::run_recipe");

    let mut report = DemoReport::default();
    let image = match super::load_image_relative(base_dir, &recipe.input) {
        Ok(img) => img,
        Err(e) => {
            let msg = format!("Failed to load input: {e:#}");
            println!("{msg}");
            report.steps.push(StepOutcome::Skipped(msg));
            return Ok(report);
        }
    };
    info!(input = %recipe.input, w = image.width(), h = image.height(), "Loaded input");

    let inputs = Inputs {
        mask: load_optional(base_dir, recipe.mask.as_deref(), "mask"),
        lookup: load_lookup(base_dir, recipe.lookup.as_deref()),
        image,
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut previous: Option<Image> = None;
    for step in &recipe.steps {
        let source = match (&previous, step.chain) {
            (Some(prev), true) => prev,
            _ => &inputs.image,
        };
        let (outcome, rendered) = run_step(step, source, &inputs, out_dir)?;
        if let StepOutcome::Skipped(msg) = &outcome {
            println!("{msg}");
        }
        if rendered.is_some() {
            previous = rendered;
        }
        report.steps.push(outcome);
    }
    Ok(report)
}

pub fn run(args: DemoArgs, verbose: bool) -> Result<()> {
    trace!(recipe = ?args.recipe, "demo::run");

    if args.print_default {
        print!("{}", Recipe::builtin().to_yaml()?);
        return Ok(());
    }

    let (recipe, base_dir) = match &args.recipe {
        Some(path) => {
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (Recipe::load(path)?, base)
        }
        None => (Recipe::builtin(), PathBuf::from(".")),
    };

    let out_dir = args.out_dir.clone().unwrap_or_else(|| base_dir.clone());
    if verbose {
        println!("Running {} steps from {}", recipe.steps.len(), base_dir.display());
    }

    let report = run_recipe(&recipe, &base_dir, &out_dir)?;

    if verbose {
        for path in report.written() {
            println!("Wrote {}", path.display());
        }
        println!("Done.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{GaussianBlurParams, LensBlurParams, VibranceParams};

    fn write_scene(dir: &Path) {
        let mut img = Image::new(24, 16, 3).unwrap();
        for y in 0..16 {
            for x in 0..24 {
                img.set_pixel(x, y, &[x as f32 / 23.0, y as f32 / 15.0, 0.4]).unwrap();
            }
        }
        lensfx_io::write_image(dir.join("input.png"), &img).unwrap();
        let mask = Image::filled(12, 8, &[0.2]).unwrap();
        lensfx_io::write_image(dir.join("mask.png"), &mask).unwrap();
        let table = lensfx_lut::lookup_image::identity_image(16).unwrap();
        lensfx_io::write_image(dir.join("lookup.png"), &table).unwrap();
    }

    fn builtin_on_png() -> Recipe {
        Recipe { input: "input.png".to_string(), ..Recipe::builtin() }
    }

    #[test]
    fn builtin_recipe_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path());
        let out = dir.path().join("out");

        let report = run_recipe(&builtin_on_png(), dir.path(), &out).unwrap();
        let written = report.written();
        assert_eq!(written.len(), 6, "{report:?}");
        for path in &written {
            let img = lensfx_io::read_image(path).unwrap();
            assert_eq!((img.width(), img.height()), (24, 16));
        }
        match report.steps.last().unwrap() {
            StepOutcome::Printed(text) => assert!(text.starts_with("average color:")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_side_inputs_skip_steps() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path());
        std::fs::remove_file(dir.path().join("mask.png")).unwrap();
        let recipe = Recipe {
            lookup: Some("absent.cube".to_string()),
            ..builtin_on_png()
        };

        let report = run_recipe(&recipe, dir.path(), dir.path()).unwrap();
        let skipped: Vec<_> = report
            .steps
            .iter()
            .filter_map(|s| match s {
                StepOutcome::Skipped(m) => Some(m.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, ["lens-blur: no mask", "lookup: no lookup table"]);
        assert_eq!(report.written().len(), 4);
    }

    #[test]
    fn missing_input_stops_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_recipe(&Recipe::builtin(), dir.path(), dir.path()).unwrap();
        assert_eq!(report.steps.len(), 1);
        assert!(matches!(&report.steps[0], StepOutcome::Skipped(m) if m.starts_with("Failed to load input")));
    }

    #[test]
    fn unsupported_extension_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path());
        let recipe = Recipe {
            input: "input.png".to_string(),
            mask: None,
            lookup: None,
            steps: vec![Step {
                output: Some("blur.bmp".to_string()),
                chain: false,
                effect: Effect::GaussianBlur(GaussianBlurParams::default()),
            }],
        };
        let report = run_recipe(&recipe, dir.path(), dir.path()).unwrap();
        assert!(matches!(&report.steps[0], StepOutcome::Skipped(m) if m.contains("unsupported format")));
        assert!(!dir.path().join("blur.bmp").exists());
    }

    #[test]
    fn zero_radius_lens_blur_needs_no_mask() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path());
        let step = |output: &str, radius| Step {
            output: Some(output.to_string()),
            chain: false,
            effect: Effect::LensBlur(LensBlurParams { radius, ..Default::default() }),
        };
        let recipe = Recipe {
            input: "input.png".to_string(),
            mask: None,
            lookup: None,
            steps: vec![step("flat.png", 0.0), step("bokeh.png", 4.0)],
        };

        let report = run_recipe(&recipe, dir.path(), dir.path()).unwrap();
        assert_eq!(report.steps[0], StepOutcome::Written(dir.path().join("flat.png")));
        assert_eq!(report.steps[1], StepOutcome::Skipped("lens-blur: no mask".to_string()));

        let input = lensfx_io::read_image(dir.path().join("input.png")).unwrap();
        let flat = lensfx_io::read_image(dir.path().join("flat.png")).unwrap();
        assert_eq!((flat.width(), flat.height()), (24, 16));
        for (a, b) in input.data().iter().zip(flat.data()) {
            assert!((a - b).abs() < 2.0 / 255.0);
        }
    }

    #[test]
    fn chained_steps_use_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path());
        let recipe = Recipe {
            input: "input.png".to_string(),
            mask: Some("mask.png".to_string()),
            lookup: None,
            steps: vec![
                Step {
                    output: Some("bokeh.png".to_string()),
                    chain: false,
                    effect: Effect::LensBlur(LensBlurParams { radius: 3.0, ..Default::default() }),
                },
                Step {
                    output: Some("final.tiff".to_string()),
                    chain: true,
                    effect: Effect::Vibrance(VibranceParams { amount: 0.0 }),
                },
            ],
        };
        let report = run_recipe(&recipe, dir.path(), dir.path()).unwrap();
        assert_eq!(report.written().len(), 2);

        // Zero vibrance copies its source, so the chained output matches the bokeh render
        let bokeh = lensfx_io::read_image(dir.path().join("bokeh.png")).unwrap();
        let last = lensfx_io::read_image(dir.path().join("final.tiff")).unwrap();
        for (a, b) in bokeh.data().iter().zip(last.data()) {
            assert!((a - b).abs() < 2.0 / 255.0);
        }
    }
}
