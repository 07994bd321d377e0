//! Anti-fisheye command

use crate::FisheyeArgs;
use anyhow::Result;
use lensfx_ops::AntiFishEye;
use tracing::{info, trace};

pub fn run(args: FisheyeArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), factor = args.factor, "fisheye::run");

    let image = super::load_image(&args.input)?;
    info!(factor = args.factor, w = image.width(), h = image.height(), "Correcting barrel distortion");
    if verbose {
        println!("Anti-fisheye (factor={}) on {}", args.factor, args.input.display());
    }

    let output = super::render(&AntiFishEye { input: Some(image), factor: args.factor })?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
