//! Lens blur command
//!
//! Hexagonal bokeh. The mask's first channel sets the per-pixel focus
//! (white sharp, black fully blurred); a mask of another size is resized to
//! the input.

use crate::LensBlurArgs;
use anyhow::Result;
use lensfx_ops::LensBlur;
use tracing::{debug, info, trace};

pub fn run(args: LensBlurArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), mask = %args.mask.display(), "lens_blur::run");

    let image = super::load_image(&args.input)?;
    let mask = super::load_image(&args.mask)?;
    if !mask.same_extent(&image) {
        debug!(
            mask_w = mask.width(),
            mask_h = mask.height(),
            w = image.width(),
            h = image.height(),
            "mask will be resized"
        );
    }

    info!(radius = args.radius, brightness = args.brightness, angle = args.angle, "Applying lens blur");
    if verbose {
        println!("Lens blur (radius={}) on {}", args.radius, args.input.display());
    }

    let filter = LensBlur {
        input: Some(image),
        mask: Some(mask),
        radius: args.radius,
        brightness: args.brightness,
        angle: args.angle,
    };
    let output = super::render(&filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
