//! Adobe/Resolve `.cube` 3D LUT files.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "LUT Name"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.0 0.0 0.0
//! ...
//! 1.0 1.0 1.0
//! ```
//!
//! Data lines list red fastest, which is also the in-memory order of
//! [`Lut3D`], so entries are stored as read. 1D LUTs are rejected.
//!
//! # Example
//!
//! ```rust,ignore
//! use lensfx_lut::cube;
//!
//! let lut = cube::read_3d("grade.cube")?;
//! let rgb = lut.apply([0.5, 0.3, 0.2]);
//! ```

use crate::{Lut3D, LutError, LutResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Reads a 3D LUT from a `.cube` file.
pub fn read_3d<P: AsRef<Path>>(path: P) -> LutResult<Lut3D> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let lut = parse_3d(BufReader::new(file))?;
    debug!(path = %path.display(), size = lut.size, "loaded cube LUT");
    Ok(lut)
}

/// Parses a 3D LUT from a reader.
pub fn parse_3d<R: BufRead>(reader: R) -> LutResult<Lut3D> {
    let mut size: Option<usize> = None;
    let mut domain_min = [0.0_f32; 3];
    let mut domain_max = [1.0_f32; 3];
    let mut data: Vec<[f32; 3]> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("TITLE") {
            continue;
        } else if line.starts_with("LUT_3D_SIZE") {
            let n = parse_size(line, line_no)?;
            data.reserve(n * n * n);
            size = Some(n);
        } else if line.starts_with("LUT_1D_SIZE") {
            return Err(LutError::parse(line_no, "expected 3D LUT, found 1D"));
        } else if line.starts_with("DOMAIN_MIN") {
            domain_min = parse_triplet(&line["DOMAIN_MIN".len()..], line_no)?;
        } else if line.starts_with("DOMAIN_MAX") {
            domain_max = parse_triplet(&line["DOMAIN_MAX".len()..], line_no)?;
        } else if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // Unknown keyword (LUT_3D_INPUT_RANGE and friends)
            debug!(line = line_no, "skipping cube keyword: {}", line);
        } else {
            data.push(parse_triplet(line, line_no)?);
        }
    }

    let size = size.ok_or_else(|| LutError::parse(0, "missing LUT_3D_SIZE"))?;
    let expected = size * size * size;
    if data.len() != expected {
        return Err(LutError::parse(
            0,
            format!("expected {} values, found {}", expected, data.len()),
        ));
    }

    Ok(Lut3D::from_data(data, size)?.with_domain(domain_min, domain_max))
}

/// Writes a 3D LUT to a `.cube` file.
pub fn write_3d<P: AsRef<Path>>(path: P, lut: &Lut3D) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    format_3d(&mut writer, lut)?;
    writer.flush()?;
    Ok(())
}

/// Writes `.cube` text for a 3D LUT into any writer.
pub fn format_3d<W: Write>(writer: &mut W, lut: &Lut3D) -> LutResult<()> {
    writeln!(writer, "# Generated by lensfx")?;
    writeln!(writer, "LUT_3D_SIZE {}", lut.size)?;

    let min = lut.domain_min;
    let max = lut.domain_max;
    if min != [0.0; 3] || max != [1.0; 3] {
        writeln!(writer, "DOMAIN_MIN {} {} {}", min[0], min[1], min[2])?;
        writeln!(writer, "DOMAIN_MAX {} {} {}", max[0], max[1], max[2])?;
    }
    writeln!(writer)?;

    for rgb in &lut.data {
        writeln!(writer, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2])?;
    }
    Ok(())
}

fn parse_size(line: &str, line_no: usize) -> LutResult<usize> {
    let value = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| LutError::parse(line_no, "invalid size line"))?;
    let size: usize = value
        .parse()
        .map_err(|_| LutError::parse(line_no, format!("invalid size value: {value}")))?;
    if !(2..=256).contains(&size) {
        return Err(LutError::parse(line_no, format!("LUT_3D_SIZE {size} out of range 2..=256")));
    }
    Ok(size)
}

fn parse_triplet(text: &str, line_no: usize) -> LutResult<[f32; 3]> {
    let mut parts = text.split_whitespace();
    let mut out = [0.0f32; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| LutError::parse(line_no, format!("expected 3 values, got {c}")))?;
        *slot = token
            .parse()
            .map_err(|_| LutError::parse(line_no, format!("invalid number: {token}")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_CUBE: &str = r#"
# Test LUT
TITLE "Swap"
LUT_3D_SIZE 2
DOMAIN_MIN 0.0 0.0 0.0
DOMAIN_MAX 1.0 1.0 1.0

0.0 0.0 0.0
0.0 0.0 1.0
0.0 1.0 0.0
0.0 1.0 1.0
1.0 0.0 0.0
1.0 0.0 1.0
1.0 1.0 0.0
1.0 1.0 1.0
"#;

    #[test]
    fn test_parse_red_fastest() {
        let lut = parse_3d(Cursor::new(TWO_CUBE)).unwrap();
        assert_eq!(lut.size, 2);
        // Second line is r=1, g=0, b=0 and maps red to blue
        assert_eq!(lut.get(1, 0, 0), [0.0, 0.0, 1.0]);
        assert_eq!(lut.get(0, 0, 1), [1.0, 0.0, 0.0]);
        let out = lut.apply([1.0, 0.0, 0.0]);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reject_1d() {
        let err = parse_3d(Cursor::new("LUT_1D_SIZE 3\n0 0 0\n")).unwrap_err();
        assert!(matches!(err, LutError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_missing_size() {
        let err = parse_3d(Cursor::new("0 0 0\n")).unwrap_err();
        assert!(err.to_string().contains("LUT_3D_SIZE"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n0 x 0\n";
        let err = parse_3d(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, LutError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_format_header() {
        let mut out = Vec::new();
        format_3d(&mut out, &Lut3D::identity(2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("LUT_3D_SIZE 2"));
        assert!(!text.contains("DOMAIN_MIN"));
        assert_eq!(text.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit())).count(), 8);
    }
}
