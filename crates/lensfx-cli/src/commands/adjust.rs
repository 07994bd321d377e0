//! Tone and motion adjustments: highlight/shadow, spin blur, vibrance.

use crate::{HighlightShadowArgs, SpinBlurArgs, VibranceArgs};
use anyhow::Result;
use lensfx_ops::{HighlightShadowAdjust, SpinBlur, Vibrance};
use tracing::{info, trace};

pub fn run_highlight_shadow(args: HighlightShadowArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "adjust::run_highlight_shadow");

    let image = super::load_image(&args.input)?;
    info!(highlight = args.highlight, shadow = args.shadow, radius = args.radius, "Adjusting highlights and shadows");
    if verbose {
        println!(
            "Highlight {} / shadow {} on {}",
            args.highlight,
            args.shadow,
            args.input.display()
        );
    }

    let filter = HighlightShadowAdjust {
        input: Some(image),
        radius: args.radius,
        highlight_amount: args.highlight,
        shadow_amount: args.shadow,
    };
    let output = super::render(&filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}

pub fn run_spin_blur(args: SpinBlurArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "adjust::run_spin_blur");

    let image = super::load_image(&args.input)?;
    info!(steps = args.steps, delta = args.delta, smooth = args.smooth, "Applying spin blur");
    if verbose {
        println!("Spin blur ({} steps) on {}", args.steps, args.input.display());
    }

    let filter = SpinBlur { input: Some(image), steps: args.steps, delta: args.delta, smooth: args.smooth };
    let output = super::render(&filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}

pub fn run_vibrance(args: VibranceArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), amount = args.amount, "adjust::run_vibrance");

    let image = super::load_image(&args.input)?;
    info!(amount = args.amount, "Applying vibrance");
    if verbose {
        println!("Vibrance {} on {}", args.amount, args.input.display());
    }

    let output = super::render(&Vibrance { input: Some(image), amount: args.amount })?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
