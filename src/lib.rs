//! # Gravitational lensing observables
//!
//! Two complementary views of gravitational lensing:
//!  - lens-plane maps: the [deflection] angle of a power-law lens sampled on a grid and
//!    the [convergence] reconstructed from any pair of deflection angle maps,
//!  - [microlensing] by a point mass: image positions, magnifications, light centroid
//!    and the light curve of a source moving behind the lens.
//!
//! Physical inputs are [units::Quantity] normalized to SI, grids are [nalgebra::DMatrix]
//! stored as NumPy files with the [grid] module.

pub mod convergence;
pub mod deflection;
mod error;
pub mod grid;
pub mod microlensing;
#[cfg(feature = "plot")]
pub mod plot;
pub mod units;

pub use convergence::{reconstruct, Convergence};
pub use deflection::{DeflectionField, DeflectionModel, LensPlaneGrid, PowerLawLens};
pub use error::Error;
pub use microlensing::{LightCurve, Microlens, MicrolensEvent, PointLens};
pub use units::{Quantity, Unit};
