//! Resize command

use crate::ResizeArgs;
use anyhow::{bail, Result};
use lensfx_ops::resize::resize;
use lensfx_ops::ResampleFilter;
use tracing::{info, trace};

/// Target size from explicit dimensions or a scale factor. A single
/// dimension keeps the aspect ratio.
pub fn target_size(
    src: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    scale: Option<f32>,
) -> Result<(u32, u32)> {
    let (sw, sh) = src;
    let aspect = |num: u32, a: u32, b: u32| ((num as f64 * a as f64 / b as f64).round() as u32).max(1);
    let size = match (width, height, scale) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, _) => (w, aspect(w, sh, sw)),
        (None, Some(h), _) => (aspect(h, sw, sh), h),
        (None, None, Some(s)) if s > 0.0 => {
            (((sw as f32 * s).round() as u32).max(1), ((sh as f32 * s).round() as u32).max(1))
        }
        (None, None, Some(s)) => bail!("Scale must be positive, got {s}"),
        (None, None, None) => bail!("Specify --width, --height or --scale"),
    };
    if size.0 == 0 || size.1 == 0 {
        bail!("Target size {}x{} is empty", size.0, size.1);
    }
    Ok(size)
}

pub fn run(args: ResizeArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "resize::run");

    let image = super::load_image(&args.input)?;
    let filter: ResampleFilter = args.filter.parse()?;
    let (w, h) = target_size((image.width(), image.height()), args.width, args.height, args.scale)?;

    info!(from_w = image.width(), from_h = image.height(), w, h, ?filter, "Resizing");
    if verbose {
        println!("Resizing {}x{} -> {}x{} ({:?})", image.width(), image.height(), w, h, filter);
    }

    let output = resize(&image, w, h, filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}
