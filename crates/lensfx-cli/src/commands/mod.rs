//! CLI command implementations

pub mod adjust;
pub mod analyze;
pub mod blur;
pub mod demo;
pub mod fisheye;
pub mod lens_blur;
pub mod lookup;
pub mod prism;
pub mod resize;

use anyhow::{bail, Context, Result};
use lensfx_core::{Image, Rect};
use lensfx_ops::Filter;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<Image> {
    lensfx_io::read_image(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Load image named relative to `base_dir`
pub fn load_image_relative(base_dir: &Path, name: &str) -> Result<Image> {
    let path = lensfx_io::resolve_relative(base_dir, name);
    lensfx_io::read_image(&path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    lensfx_io::write_image(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Runs a filter, failing when it has nothing to produce.
pub fn render(filter: &dyn Filter) -> Result<Image> {
    match filter.output_image().with_context(|| format!("{} failed", filter.name()))? {
        Some(img) => Ok(img),
        None => bail!("{} produced no image (missing input)", filter.name()),
    }
}

/// Parses `x,y,width,height`.
pub fn parse_rect(s: &str) -> Result<Rect> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid rect '{s}'"))?;
    match parts[..] {
        [x, y, w, h] if w > 0 && h > 0 => Ok(Rect::new(x, y, w, h)),
        [_, _, _, _] => bail!("Rect '{s}' is empty"),
        _ => bail!("Rect '{s}' must be x,y,width,height"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect() {
        assert_eq!(parse_rect("1, 2,30,40").unwrap(), Rect::new(1, 2, 30, 40));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("1,2,0,4").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }

    #[test]
    fn test_render_missing_input() {
        let err = render(&lensfx_ops::Prism::default()).unwrap_err();
        assert!(err.to_string().contains("Prism"));
    }
}
