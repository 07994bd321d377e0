//! Row-parallel iteration.
//!
//! Every pass in this crate writes its output one row at a time. With the
//! `parallel` feature the rows are split across the rayon pool, otherwise
//! they run in order on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for every `row_len`-sized row of `data`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<F>(data: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Calls `f(y, row)` for every `row_len`-sized row of `data`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<F>(data: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]),
{
    data.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Transposes interleaved image data so columns become rows.
///
/// Pixel (x, y) of a `width x height` image ends up at (y, x) of a
/// `height x width` image.
pub(crate) fn transpose(src: &[f32], width: usize, height: usize, channels: usize) -> Vec<f32> {
    let mut dst = vec![0.0f32; width * height * channels];
    for_each_row(&mut dst, height * channels, |x, col| {
        for y in 0..height {
            let src_idx = (y * width + x) * channels;
            col[y * channels..(y + 1) * channels].copy_from_slice(&src[src_idx..src_idx + channels]);
        }
    });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_indexed() {
        let mut data = vec![0.0f32; 12];
        for_each_row(&mut data, 4, |y, row| row.fill(y as f32));
        assert_eq!(&data[8..], &[2.0; 4]);
    }

    #[test]
    fn test_transpose() {
        // 3x2 single channel
        let src = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(transpose(&src, 3, 2, 1), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}
