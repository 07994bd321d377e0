//! Interpolation methods for LUT evaluation.

/// Interpolation method for 3D LUT evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Nearest grid point.
    Nearest,

    /// Trilinear interpolation between the 8 surrounding grid points.
    ///
    /// This is what a GPU sampler does with a 3D texture, and what the
    /// color lookup filter uses.
    #[default]
    Linear,

    /// Tetrahedral interpolation.
    ///
    /// Uses 4 of the 8 corners; keeps the neutral axis exact.
    Tetrahedral,
}

impl std::str::FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" | "trilinear" => Ok(Self::Linear),
            "tetrahedral" | "tetra" => Ok(Self::Tetrahedral),
            other => Err(format!("unknown interpolation: {other}")),
        }
    }
}
