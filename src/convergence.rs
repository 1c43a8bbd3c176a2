//! Convergence maps from deflection angle maps
//!
//! The convergence is half the divergence of the deflection angle field,
//! `κ = ½ ∇·α`, with the derivatives computed by finite differences.
//! The result is **not** scaled by the `(θ_E/D_L)²` factor that turns it into a
//! physical surface mass density; use [Convergence::scale] to apply it.

use std::ops::Deref;

use nalgebra::DMatrix;

use crate::deflection::DeflectionField;

#[derive(thiserror::Error, Debug)]
pub enum ConvergenceError {
    #[error("deflection maps shape mismatch: {x:?} vs {y:?}")]
    ShapeMismatch { x: (usize, usize), y: (usize, usize) },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
type Result<T> = std::result::Result<T, ConvergenceError>;

/// Grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// first axis, along the rows
    X,
    /// second axis, along the columns
    Y,
}

/// Finite-difference derivative of `grid` along `axis`
///
/// Central differences in the interior and first-order one-sided differences
/// at both ends, `spacing` being the sample step along `axis`.
pub fn gradient(grid: &DMatrix<f64>, axis: Axis, spacing: f64) -> Result<DMatrix<f64>> {
    let (n_rows, n_cols) = grid.shape();
    let n = match axis {
        Axis::X => n_rows,
        Axis::Y => n_cols,
    };
    if n < 2 {
        return Err(ConvergenceError::InvalidInput(format!(
            "at least 2 samples are required along {:?}, found {}",
            axis, n
        )));
    }
    let at = |i: usize, j: usize, k: usize| match axis {
        Axis::X => grid[(k, j)],
        Axis::Y => grid[(i, k)],
    };
    Ok(DMatrix::from_fn(n_rows, n_cols, |i, j| {
        let k = match axis {
            Axis::X => i,
            Axis::Y => j,
        };
        if k == 0 {
            (at(i, j, 1) - at(i, j, 0)) / spacing
        } else if k == n - 1 {
            (at(i, j, n - 1) - at(i, j, n - 2)) / spacing
        } else {
            (at(i, j, k + 1) - at(i, j, k - 1)) / (2f64 * spacing)
        }
    }))
}

fn check_finite(name: &str, grid: &DMatrix<f64>) -> Result<()> {
    let (n_rows, _) = grid.shape();
    match grid.iter().position(|v| !v.is_finite()) {
        Some(k) => Err(ConvergenceError::InvalidInput(format!(
            "{} has a non-finite value ({}) at ({},{})",
            name,
            grid[k],
            k % n_rows,
            k / n_rows
        ))),
        None => Ok(()),
    }
}

/// Unscaled convergence map
#[derive(Debug, Clone, PartialEq)]
pub struct Convergence(DMatrix<f64>);
impl Deref for Convergence {
    type Target = DMatrix<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<Convergence> for DMatrix<f64> {
    fn from(convergence: Convergence) -> Self {
        convergence.0
    }
}
impl Convergence {
    /// Multiplies the convergence by a physical scale factor, e.g. `(θ_E/D_L)²`
    pub fn scale(self, factor: f64) -> Self {
        Self(self.0 * factor)
    }
    /// Returns the (mean, min, max) of the map
    pub fn stats(&self) -> (f64, f64, f64) {
        (
            self.0.mean(),
            self.0.iter().cloned().fold(f64::INFINITY, f64::min),
            self.0.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

/// Reconstructs the convergence from the deflection maps with unit sample spacing
pub fn reconstruct(
    deflection_x: &DMatrix<f64>,
    deflection_y: &DMatrix<f64>,
) -> Result<Convergence> {
    reconstruct_with_spacing(deflection_x, deflection_y, (1f64, 1f64))
}

/// Reconstructs the convergence from the deflection maps sampled with `spacing`
/// along the (x,y) axes
pub fn reconstruct_with_spacing(
    deflection_x: &DMatrix<f64>,
    deflection_y: &DMatrix<f64>,
    spacing: (f64, f64),
) -> Result<Convergence> {
    if deflection_x.shape() != deflection_y.shape() {
        return Err(ConvergenceError::ShapeMismatch {
            x: deflection_x.shape(),
            y: deflection_y.shape(),
        });
    }
    if !(spacing.0.is_finite() && spacing.1.is_finite() && spacing.0 > 0. && spacing.1 > 0.) {
        return Err(ConvergenceError::InvalidInput(format!(
            "sample spacing must be finite and positive, found {:?}",
            spacing
        )));
    }
    check_finite("deflection_x", deflection_x)?;
    check_finite("deflection_y", deflection_y)?;
    let dax_dx = gradient(deflection_x, Axis::X, spacing.0)?;
    let day_dy = gradient(deflection_y, Axis::Y, spacing.1)?;
    Ok(Convergence((dax_dx + day_dy) * 0.5))
}

impl DeflectionField {
    /// Convergence of the deflection field, see [reconstruct_with_spacing]
    pub fn convergence(&self, spacing: (f64, f64)) -> Result<Convergence> {
        reconstruct_with_spacing(self.x(), self.y(), spacing)
    }
}
