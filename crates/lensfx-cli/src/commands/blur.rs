//! Blur command
//!
//! Gaussian (radius is sigma) or box blur.

use crate::BlurArgs;
use anyhow::{bail, Result};
use lensfx_ops::blur::box_blur;
use lensfx_ops::GaussianBlur;
use tracing::{info, trace};

pub fn run(args: BlurArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), blur_type = %args.blur_type, radius = args.radius, "blur::run");

    let image = super::load_image(&args.input)?;
    info!(blur_type = %args.blur_type, radius = args.radius, w = image.width(), h = image.height(), "Applying blur");
    if verbose {
        println!("Applying {} blur (radius={}) to {}", args.blur_type, args.radius, args.input.display());
    }

    let blurred = match args.blur_type.to_lowercase().as_str() {
        "gaussian" | "gauss" => super::render(&GaussianBlur { input: Some(image), radius: args.radius })?,
        "box" => {
            if args.radius < 0.0 {
                bail!("Box radius must be non-negative, got {}", args.radius);
            }
            box_blur(&image, args.radius.round() as usize)?
        }
        other => bail!("Unknown blur type '{other}' (expected gaussian or box)"),
    };
    super::save_image(&args.output, &blurred)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
