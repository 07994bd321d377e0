//! Lookup command
//!
//! Grades through a tiled lookup image or a `.cube` file, picked by
//! extension.

use crate::LookupArgs;
use anyhow::{Context, Result};
use lensfx_lut::Interpolation;
use lensfx_ops::ColorLookup;
use std::path::Path;
use tracing::{debug, info, trace};

/// True for `.cube` paths.
pub fn is_cube(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("cube"))
}

/// Builds the filter with the table at `table` loaded into the right slot.
/// `interpolation` applies to `.cube` tables; lookup images always blend
/// linearly.
pub fn lookup_filter(table: &Path, intensity: f32, interpolation: Interpolation) -> Result<ColorLookup> {
    let mut filter = ColorLookup { intensity, ..Default::default() };
    if is_cube(table) {
        let lut = lensfx_lut::read_cube(table)
            .with_context(|| format!("Failed to load LUT: {}", table.display()))?
            .with_interpolation(interpolation);
        debug!(size = lut.size, ?interpolation, "cube table");
        filter.cube = Some(lut);
    } else {
        filter.lookup_table = Some(super::load_image(table)?);
    }
    Ok(filter)
}

pub fn run(args: LookupArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), table = %args.table.display(), "lookup::run");

    let interpolation: Interpolation = args.interpolation.parse().map_err(anyhow::Error::msg)?;
    let image = super::load_image(&args.input)?;
    let mut filter = lookup_filter(&args.table, args.intensity, interpolation)?;
    filter.input = Some(image);

    info!(table = %args.table.display(), intensity = args.intensity, "Applying color lookup");
    if verbose {
        println!("Color lookup {} on {}", args.table.display(), args.input.display());
    }

    let output = super::render(&filter)?;
    super::save_image(&args.output, &output)?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cube() {
        assert!(is_cube(Path::new("grade.cube")));
        assert!(is_cube(Path::new("GRADE.CUBE")));
        assert!(!is_cube(Path::new("lookup.png")));
        assert!(!is_cube(Path::new("cube")));
    }

    #[test]
    fn test_cube_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.cube");
        lensfx_lut::write_cube(&path, &lensfx_lut::Lut3D::identity(4)).unwrap();
        let filter = lookup_filter(&path, 0.5, Interpolation::Tetrahedral).unwrap();
        assert_eq!(filter.cube.as_ref().unwrap().interpolation, Interpolation::Tetrahedral);
        assert!(filter.lookup_table.is_none());
        assert_eq!(filter.intensity, 0.5);
    }
}
