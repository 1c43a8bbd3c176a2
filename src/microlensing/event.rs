use rayon::prelude::*;

use super::{
    centroid_shift, deviation, finite, image_positions, magnification, LightCurve,
    Magnification, MicrolensError, Observables, PointLens, Result,
};
use crate::units::{self, Dimension, Quantity};

/// Microlensing of a source at a fixed angular separation from the lens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Microlens {
    lens: PointLens,
    beta: f64,
    y: f64,
}
impl Microlens {
    /// Creates the microlens for the source-lens angular separation `beta`
    ///
    /// `beta` is signed: a negative separation puts the source on the other side of the lens.
    pub fn new(lens: PointLens, beta: Quantity) -> Result<Self> {
        Self::from_si(lens, units::to_canonical(beta, Dimension::Angle)?)
    }
    /// Creates the microlens for the source-lens angular separation `beta` [rad]
    pub fn from_si(lens: PointLens, beta: f64) -> Result<Self> {
        let beta = finite("source-lens separation", beta)?;
        Ok(Self {
            lens,
            beta,
            y: beta / lens.einstein_radius(),
        })
    }
    pub fn lens(&self) -> &PointLens {
        &self.lens
    }
    /// Einstein angular radius [rad]
    pub fn einstein_radius(&self) -> f64 {
        self.lens.einstein_radius()
    }
    /// Source-lens angular separation [rad]
    pub fn beta(&self) -> f64 {
        self.beta
    }
    /// Impact parameter `y = beta/thetaE`
    pub fn impact_parameter(&self) -> f64 {
        self.y
    }
    /// Image and counter-image positions
    pub fn image_pos(&self) -> (f64, f64) {
        image_positions(self.y)
    }
    pub fn magnification(&self) -> Result<Magnification> {
        magnification(self.y)
    }
    pub fn centroid_shift(&self) -> f64 {
        centroid_shift(self.y)
    }
    pub fn deviation(&self) -> f64 {
        deviation(self.y)
    }
    pub fn observables(&self) -> Observables {
        Observables::new(self.y)
    }
}

/// Microlensing event along a straight-line source-lens relative trajectory
///
/// The source is at its closest approach `beta_0` from the lens at `t=0` and moves
/// with the relative transverse velocity `v`: `beta(t) = sqrt(beta_0² + (thetaE t/t_E)²)`
/// with the Einstein crossing time `t_E = thetaE D_l / v`.
#[derive(Debug, Clone, PartialEq)]
pub struct MicrolensEvent {
    lens: PointLens,
    beta_0: f64,
    velocity: f64,
    t_e: f64,
    time: Vec<f64>,
    beta: Vec<f64>,
    y: Vec<f64>,
}
impl MicrolensEvent {
    /// Creates the event sampled at `time`
    pub fn new(
        lens: PointLens,
        beta_0: Quantity,
        velocity: Quantity,
        time: &[Quantity],
    ) -> Result<Self> {
        let time = time
            .iter()
            .map(|t| units::to_canonical(*t, Dimension::Time))
            .collect::<std::result::Result<Vec<f64>, _>>()?;
        Self::from_si(
            lens,
            units::to_canonical(beta_0, Dimension::Angle)?,
            units::to_canonical(velocity, Dimension::Velocity)?,
            time,
        )
    }
    /// Creates the event from `beta_0` [rad], `velocity` [m/s] and `time` [s]
    pub fn from_si(lens: PointLens, beta_0: f64, velocity: f64, time: Vec<f64>) -> Result<Self> {
        let beta_0 = finite("closest approach separation", beta_0)?;
        let velocity = finite("transverse velocity", velocity)?;
        if velocity <= 0f64 {
            return Err(MicrolensError::Domain(format!(
                "transverse velocity must be positive, found {velocity}m/s"
            )));
        }
        if let Some((k, t)) = time.iter().enumerate().find(|(_, t)| !t.is_finite()) {
            return Err(MicrolensError::InvalidInput(format!(
                "time sample #{k} must be finite, found {t}"
            )));
        }
        let theta_e = lens.einstein_radius();
        let t_e = lens.einstein_length() / velocity;
        let beta: Vec<f64> = time
            .iter()
            .map(|t| beta_0.hypot(theta_e * t / t_e))
            .collect();
        let y = beta.iter().map(|b| b / theta_e).collect();
        log::debug!(
            "Microlensing event with t_E={:.3}d over {} samples",
            units::from_canonical(t_e, units::Unit::Day),
            time.len()
        );
        Ok(Self {
            lens,
            beta_0,
            velocity,
            t_e,
            time,
            beta,
            y,
        })
    }
    pub fn lens(&self) -> &PointLens {
        &self.lens
    }
    /// Einstein angular radius [rad]
    pub fn einstein_radius(&self) -> f64 {
        self.lens.einstein_radius()
    }
    /// Einstein crossing time [s]
    pub fn einstein_time(&self) -> f64 {
        self.t_e
    }
    /// Closest approach separation [rad]
    pub fn beta_0(&self) -> f64 {
        self.beta_0
    }
    /// Relative transverse velocity [m/s]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
    /// Time samples [s]
    pub fn time(&self) -> &[f64] {
        &self.time
    }
    /// Source-lens angular separation time series [rad]
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }
    /// Impact parameter time series
    pub fn impact_parameter(&self) -> &[f64] {
        &self.y
    }
    pub fn image_pos(&self) -> Vec<(f64, f64)> {
        self.y.iter().map(|&y| image_positions(y)).collect()
    }
    /// Magnifications time series, with the failure of each singular sample
    pub fn magnification(&self) -> Vec<Result<Magnification>> {
        self.y.par_iter().map(|&y| magnification(y)).collect()
    }
    pub fn centroid_shift(&self) -> Vec<f64> {
        self.y.iter().map(|&y| centroid_shift(y)).collect()
    }
    pub fn deviation(&self) -> Vec<f64> {
        self.y.iter().map(|&y| deviation(y)).collect()
    }
    /// Evaluates all the observables at each time sample
    pub fn light_curve(&self) -> LightCurve {
        let samples: Vec<_> = self.y.par_iter().map(|&y| Observables::new(y)).collect();
        let n_failures = samples.iter().filter(|s| s.magnification.is_err()).count();
        if n_failures > 0 {
            log::warn!(
                "{} out of {} light curve samples are singular",
                n_failures,
                samples.len()
            );
        }
        LightCurve::new(self.time.clone(), samples)
    }
}
