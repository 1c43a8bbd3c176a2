//! Point-source point-lens microlensing
//!
//! Closed-form images, magnifications and light centroid of a single point source
//! lensed by a single point mass, either for a fixed source-lens separation
//! ([Microlens]) or along a straight-line relative trajectory ([MicrolensEvent]).
//!
//! Physical inputs are given as [Quantity](crate::units::Quantity) and normalized to SI;
//! image positions and centroid offsets are in Einstein radius units.

use crate::units::{self, Dimension, Quantity, UnitsError};

mod event;
mod light_curve;
pub use event::{Microlens, MicrolensEvent};
pub use light_curve::LightCurve;

#[derive(thiserror::Error, Debug)]
pub enum MicrolensError {
    #[error("invalid lens configuration: {0}")]
    Domain(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("magnification is singular for a source aligned with the lens (y={y})")]
    Singularity { y: f64 },
    #[error("failed to normalize physical quantity")]
    Units(#[from] UnitsError),
}
type Result<T> = std::result::Result<T, MicrolensError>;

fn finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MicrolensError::InvalidInput(format!(
            "{} must be finite, found {}",
            name, value
        )))
    }
}

/// Image (`x_i`) and counter-image (`x_c`) positions along the source-lens axis
///
/// The image farther from the lens is computed first and its companion follows from
/// `x_i x_c = -1`, which keeps the small one accurate at large `|y|`.
pub fn image_positions(y: f64) -> (f64, f64) {
    let s = y.hypot(2f64);
    if y.is_sign_negative() {
        let x_c = 0.5 * y - 0.5 * s;
        (-x_c.recip(), x_c)
    } else {
        let x_i = 0.5 * y + 0.5 * s;
        (x_i, -x_i.recip())
    }
}

/// Image, counter-image and total magnifications
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnification {
    pub major: f64,
    pub minor: f64,
    pub total: f64,
}
/// Magnifications for the impact parameter `y`
///
/// Exact alignment (`y=0`) forms an Einstein ring and returns [MicrolensError::Singularity],
/// and so does any `y` close enough to 0 for the magnification to overflow.
pub fn magnification(y: f64) -> Result<Magnification> {
    let y = finite("impact parameter", y)?;
    let a = y.abs();
    let s = a.hypot(2f64);
    // (y²+2)/(y sqrt(y²+4)) without squaring y
    let u = (a + 2f64 / a) / s;
    if !u.is_finite() {
        return Err(MicrolensError::Singularity { y });
    }
    let major = 0.5 * (1f64 + u);
    // 0.5(1-u) rewritten to avoid the cancellation at large y
    let minor = -4f64 / ((s + a) * (s + a) * a * s);
    let (major, minor) = if y.is_sign_negative() {
        (minor, major)
    } else {
        (major, minor)
    };
    Ok(Magnification {
        major,
        minor,
        total: major.abs() + minor.abs(),
    })
}

/// Light centroid offset from the lens
pub fn centroid_shift(y: f64) -> f64 {
    y + deviation(y)
}

/// Light centroid deviation from the unlensed source position
pub fn deviation(y: f64) -> f64 {
    y / (y * y + 2f64)
}

/// Microlensing observables for a given impact parameter
///
/// Only the magnification can fail, the image positions and the centroid are defined
/// everywhere including at exact alignment.
#[derive(Debug)]
pub struct Observables {
    /// impact parameter
    pub y: f64,
    /// image and counter-image positions
    pub image_pos: (f64, f64),
    pub magnification: Result<Magnification>,
    pub centroid_shift: f64,
    pub deviation: f64,
}
impl Observables {
    pub fn new(y: f64) -> Self {
        Self {
            y,
            magnification: magnification(y),
            image_pos: image_positions(y),
            centroid_shift: centroid_shift(y),
            deviation: deviation(y),
        }
    }
}

/// Point mass lens at a given distance in front of the source
///
/// Mass [kg], distances [m] and Einstein radius [rad] are stored in SI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLens {
    mass: f64,
    lens_distance: f64,
    source_distance: f64,
    theta_e: f64,
}
impl PointLens {
    /// Creates a lens of mass `mass` at `lens_distance` from the observer and
    /// `source_distance` from the source
    pub fn new(mass: Quantity, lens_distance: Quantity, source_distance: Quantity) -> Result<Self> {
        Self::from_si(
            units::to_canonical(mass, Dimension::Mass)?,
            units::to_canonical(lens_distance, Dimension::Length)?,
            units::to_canonical(source_distance, Dimension::Length)?,
        )
    }
    /// Creates a lens from mass [kg] and distances [m]
    pub fn from_si(mass: f64, lens_distance: f64, source_distance: f64) -> Result<Self> {
        let mass = finite("lens mass", mass)?;
        let lens_distance = finite("lens distance", lens_distance)?;
        let source_distance = finite("source distance", source_distance)?;
        if mass <= 0f64 {
            return Err(MicrolensError::Domain(format!(
                "lens mass must be positive, found {mass}kg"
            )));
        }
        if lens_distance <= 0f64 {
            return Err(MicrolensError::Domain(format!(
                "lens distance must be positive, found {lens_distance}m"
            )));
        }
        if source_distance <= lens_distance {
            return Err(MicrolensError::Domain(format!(
                "source ({source_distance}m) must be farther than the lens ({lens_distance}m)"
            )));
        }
        let d_ls = source_distance - lens_distance;
        let dist = d_ls / (source_distance * lens_distance);
        let theta_e = (4f64 * units::G * mass * dist / (units::C * units::C)).sqrt();
        log::debug!("Einstein radius: {:.6e}rad", theta_e);
        Ok(Self {
            mass,
            lens_distance,
            source_distance,
            theta_e,
        })
    }
    /// Einstein angular radius [rad]
    pub fn einstein_radius(&self) -> f64 {
        self.theta_e
    }
    /// Lens mass [kg]
    pub fn mass(&self) -> f64 {
        self.mass
    }
    /// Observer to lens distance [m]
    pub fn lens_distance(&self) -> f64 {
        self.lens_distance
    }
    /// Observer to source distance [m]
    pub fn source_distance(&self) -> f64 {
        self.source_distance
    }
    /// Einstein radius projected on the lens plane [m]
    pub fn einstein_length(&self) -> f64 {
        self.theta_e * self.lens_distance
    }
}
