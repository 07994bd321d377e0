//! Prism command
//!
//! Chromatic aberration with radial distortion.

use crate::PrismArgs;
use anyhow::Result;
use lensfx_ops::Prism;
use tracing::{info, trace};

pub fn run(args: PrismArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "prism::run");

    let image = super::load_image(&args.input)?;
    info!(
        distortion = args.distortion,
        iterations = args.iterations,
        strength = args.strength,
        separation = args.separation,
        "Applying prism"
    );
    if verbose {
        println!("Applying prism to {}", args.input.display());
    }

    let filter = Prism {
        input: Some(image),
        distortion: args.distortion,
        iterations: args.iterations,
        strength: args.strength,
        separation: args.separation,
    };
    let output = super::render(&filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
