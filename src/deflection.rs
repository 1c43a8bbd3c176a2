//! Lens-plane deflection angles
//!
//! All lengths are dimensionless, in units of the Einstein radius.

use nalgebra::DMatrix;
use rayon::prelude::*;

#[derive(thiserror::Error, Debug)]
pub enum DeflectionError {
    #[error("deflection angle is singular at the lens center ({x1},{x2})")]
    Singularity { x1: f64, x2: f64 },
    #[error("coordinate grids shape mismatch: {x1:?} vs {x2:?}")]
    ShapeMismatch {
        x1: (usize, usize),
        x2: (usize, usize),
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
type Result<T> = std::result::Result<T, DeflectionError>;

/// Deflection angle components maps
///
/// `x` and `y` follow the first (rows) and second (columns) grid axis, respectively.
#[derive(Debug, Clone, PartialEq)]
pub struct DeflectionField {
    deflection_x: DMatrix<f64>,
    deflection_y: DMatrix<f64>,
}
impl DeflectionField {
    /// Pairs two equal-shaped deflection component maps with finite values
    pub fn new(deflection_x: DMatrix<f64>, deflection_y: DMatrix<f64>) -> Result<Self> {
        if deflection_x.shape() != deflection_y.shape() {
            return Err(DeflectionError::ShapeMismatch {
                x1: deflection_x.shape(),
                x2: deflection_y.shape(),
            });
        }
        for (name, grid) in [("x", &deflection_x), ("y", &deflection_y)] {
            if let Some(k) = grid.iter().position(|v| !v.is_finite()) {
                let (n_rows, _) = grid.shape();
                return Err(DeflectionError::InvalidInput(format!(
                    "deflection {} component is {} at ({},{})",
                    name,
                    grid[k],
                    k % n_rows,
                    k / n_rows
                )));
            }
        }
        Ok(Self {
            deflection_x,
            deflection_y,
        })
    }
    pub fn x(&self) -> &DMatrix<f64> {
        &self.deflection_x
    }
    pub fn y(&self) -> &DMatrix<f64> {
        &self.deflection_y
    }
    pub fn shape(&self) -> (usize, usize) {
        self.deflection_x.shape()
    }
    pub fn into_components(self) -> (DMatrix<f64>, DMatrix<f64>) {
        (self.deflection_x, self.deflection_y)
    }
}

/// Pixel-centred lens-plane sampling
///
/// Pixel `(i,j)` sits at `x1 = (i + 1/2 - n_rows/2) * pixel_scale`,
/// `x2 = (j + 1/2 - n_cols/2) * pixel_scale`; grids with an even number of pixels
/// never sample the lens center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensPlaneGrid {
    n_rows: usize,
    n_cols: usize,
    pixel_scale: f64,
}
impl LensPlaneGrid {
    /// A `n_rows`x`n_cols` grid with a unit pixel scale
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            pixel_scale: 1f64,
        }
    }
    /// A square grid of side `size` spanning `[-1/2,1/2]` Einstein radius
    pub fn square(size: usize) -> Self {
        Self::new(size, size).pixel_scale((size as f64).recip())
    }
    pub fn pixel_scale(self, pixel_scale: f64) -> Self {
        Self {
            pixel_scale,
            ..self
        }
    }
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }
    /// Sample spacing along both axes
    pub fn spacing(&self) -> (f64, f64) {
        (self.pixel_scale, self.pixel_scale)
    }
    /// Coordinates of pixel `(i,j)`
    pub fn coordinates(&self, i: usize, j: usize) -> (f64, f64) {
        let x = |k: usize, n: usize| (k as f64 + 0.5 - 0.5 * n as f64) * self.pixel_scale;
        (x(i, self.n_rows), x(j, self.n_cols))
    }
    /// Maps of the `x1` and `x2` coordinates
    pub fn meshgrid(&self) -> (DMatrix<f64>, DMatrix<f64>) {
        (
            DMatrix::from_fn(self.n_rows, self.n_cols, |i, j| self.coordinates(i, j).0),
            DMatrix::from_fn(self.n_rows, self.n_cols, |i, j| self.coordinates(i, j).1),
        )
    }
}

/// Lens models with an analytical deflection angle
pub trait DeflectionModel: Sync {
    /// Deflection angle `(a1,a2)` at the lens-plane point `(x1,x2)`
    fn deflection_angle(&self, x1: f64, x2: f64) -> Result<(f64, f64)>;
    /// Element-wise deflection angles of two equal-shaped coordinate maps
    ///
    /// Fails as a whole if any element fails.
    fn deflection_angles(&self, x1: &DMatrix<f64>, x2: &DMatrix<f64>) -> Result<DeflectionField> {
        if x1.shape() != x2.shape() {
            return Err(DeflectionError::ShapeMismatch {
                x1: x1.shape(),
                x2: x2.shape(),
            });
        }
        let (n_rows, n_cols) = x1.shape();
        // column-major like DMatrix storage
        let angles = x1
            .as_slice()
            .par_iter()
            .zip(x2.as_slice().par_iter())
            .map(|(&x1, &x2)| self.deflection_angle(x1, x2))
            .collect::<Result<Vec<(f64, f64)>>>()?;
        let (a1, a2): (Vec<f64>, Vec<f64>) = angles.into_iter().unzip();
        DeflectionField::new(
            DMatrix::from_vec(n_rows, n_cols, a1),
            DMatrix::from_vec(n_rows, n_cols, a2),
        )
    }
    /// Deflection angles sampled on a lens-plane grid
    fn deflection_map(&self, grid: &LensPlaneGrid) -> Result<DeflectionField> {
        let (x1, x2) = grid.meshgrid();
        self.deflection_angles(&x1, &x2)
    }
}

/// Axisymmetric lens with a power-law deflection angle magnitude `r^(2-n)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawLens {
    n: f64,
}
impl PowerLawLens {
    /// Creates a power-law lens of index `n`
    pub fn new(n: f64) -> Self {
        Self { n }
    }
    pub fn index(&self) -> f64 {
        self.n
    }
}
impl DeflectionModel for PowerLawLens {
    /// The deflection angle points away from the lens center with magnitude `r^(2-n)`
    ///
    /// The lens center `r=0` is out of domain and returns [DeflectionError::Singularity],
    /// a magnitude overflowing `f64` returns [DeflectionError::InvalidInput].
    fn deflection_angle(&self, x1: f64, x2: f64) -> Result<(f64, f64)> {
        if !(x1.is_finite() && x2.is_finite()) {
            return Err(DeflectionError::InvalidInput(format!(
                "non-finite lens-plane coordinates ({x1},{x2})"
            )));
        }
        let r = x1.hypot(x2);
        if r == 0f64 {
            return Err(DeflectionError::Singularity { x1, x2 });
        }
        let module = r.powf(2f64 - self.n);
        if !module.is_finite() {
            return Err(DeflectionError::InvalidInput(format!(
                "deflection angle magnitude {module} at ({x1},{x2}) for n={}",
                self.n
            )));
        }
        Ok((module * x1 / r, module * x2 / r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_radius() {
        let lens = PowerLawLens::new(4.);
        assert_eq!(lens.deflection_angle(1., 0.).unwrap(), (1., 0.));
        assert_eq!(lens.deflection_angle(0., 1.).unwrap(), (0., 1.));
    }

    #[test]
    fn center_is_singular() {
        for n in [-1., 0., 1., 2., 3., 4., 2.5] {
            assert!(matches!(
                PowerLawLens::new(n).deflection_angle(0., 0.),
                Err(DeflectionError::Singularity { .. })
            ));
        }
    }

    #[test]
    fn near_center_is_not_regularized() {
        let (a1, a2) = PowerLawLens::new(4.).deflection_angle(1e-3, 0.).unwrap();
        assert_relative_eq!(a1, 1e6, max_relative = 1e-12);
        assert_eq!(a2, 0.);
    }

    #[test]
    fn overflowing_magnitude() {
        assert!(matches!(
            PowerLawLens::new(400.).deflection_angle(1e-3, 0.),
            Err(DeflectionError::InvalidInput(_))
        ));
        assert!(matches!(
            PowerLawLens::new(-400.).deflection_angle(0., 1e3),
            Err(DeflectionError::InvalidInput(_))
        ));
        let grid = LensPlaneGrid::new(4, 4).pixel_scale(1e-3);
        assert!(matches!(
            PowerLawLens::new(400.).deflection_map(&grid),
            Err(DeflectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_finite_field() {
        let mut deflection_y = DMatrix::zeros(3, 4);
        deflection_y[(2, 1)] = f64::NAN;
        match DeflectionField::new(DMatrix::zeros(3, 4), deflection_y) {
            Err(DeflectionError::InvalidInput(msg)) => assert!(msg.contains("y component")),
            other => panic!("expected an invalid input error, got {:?}", other),
        }
        assert!(matches!(
            DeflectionField::new(DMatrix::from_element(2, 2, f64::INFINITY), DMatrix::zeros(2, 2)),
            Err(DeflectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn radial_direction() {
        let lens = PowerLawLens::new(2.5);
        let (x1, x2) = (-0.3, 0.4);
        let (a1, a2) = lens.deflection_angle(x1, x2).unwrap();
        assert_relative_eq!(a1.hypot(a2), 0.5f64.powf(-0.5), max_relative = 1e-12);
        assert_relative_eq!(a1 * x2 - a2 * x1, 0., epsilon = 1e-12);
        assert!(a1 * x1 + a2 * x2 > 0.);
    }

    #[test]
    fn non_finite_coordinates() {
        assert!(matches!(
            PowerLawLens::new(2.).deflection_angle(f64::NAN, 1.),
            Err(DeflectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn grid_coordinates() {
        let grid = LensPlaneGrid::square(4);
        assert_eq!(grid.coordinates(0, 0), (-0.375, -0.375));
        assert_eq!(grid.coordinates(3, 2), (0.375, 0.125));
        let (x1, x2) = grid.meshgrid();
        assert_eq!(x1[(3, 0)], 0.375);
        assert_eq!(x2[(3, 0)], -0.375);
    }

    #[test]
    fn map_matches_pointwise() {
        let lens = PowerLawLens::new(3.);
        let grid = LensPlaneGrid::new(6, 4).pixel_scale(0.25);
        let field = lens.deflection_map(&grid).unwrap();
        assert_eq!(field.shape(), (6, 4));
        for i in 0..6 {
            for j in 0..4 {
                let (x1, x2) = grid.coordinates(i, j);
                let (a1, a2) = lens.deflection_angle(x1, x2).unwrap();
                assert_eq!(field.x()[(i, j)], a1);
                assert_eq!(field.y()[(i, j)], a2);
            }
        }
    }

    #[test]
    fn odd_grid_hits_the_center() {
        assert!(matches!(
            PowerLawLens::new(4.).deflection_map(&LensPlaneGrid::square(5)),
            Err(DeflectionError::Singularity { .. })
        ));
    }

    #[test]
    fn coordinate_maps_shape_mismatch() {
        let x1 = DMatrix::from_element(3, 3, 1.);
        let x2 = DMatrix::from_element(3, 2, 1.);
        assert!(matches!(
            PowerLawLens::new(4.).deflection_angles(&x1, &x2),
            Err(DeflectionError::ShapeMismatch { .. })
        ));
    }
}
