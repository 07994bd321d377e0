//! Synthetic inputs shared by the lensfx benchmarks.
//!
//! Run with: `cargo bench -p lensfx-bench`

use lensfx_core::{Image, Result};

/// RGBA gradient with a grid of bright dots, so blurs and lookups have
/// something other than flat color to chew on.
pub fn scene(width: u32, height: u32) -> Result<Image> {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let u = x as f32 / width.max(2) as f32;
            let v = y as f32 / height.max(2) as f32;
            if x % 32 == 16 && y % 32 == 16 {
                [1.0, 1.0, 1.0, 1.0]
            } else {
                [u, v, 0.5 * (u + v), 1.0]
            }
        })
        .collect();
    Image::from_data(width, height, 4, data)
}

/// Single-channel depth ramp from 0 at the top to 1 at the bottom.
pub fn depth_mask(width: u32, height: u32) -> Result<Image> {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |_| y as f32 / height.max(2) as f32))
        .collect();
    Image::from_data(width, height, 1, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_shapes() {
        let s = scene(64, 48).unwrap();
        assert_eq!((s.width(), s.height(), s.channels()), (64, 48, 4));
        assert_eq!(s.pixel(16, 16), &[1.0, 1.0, 1.0, 1.0]);
        let m = depth_mask(8, 4).unwrap();
        assert_eq!(m.channels(), 1);
        assert_eq!(m.pixel(3, 0), &[0.0]);
    }
}
