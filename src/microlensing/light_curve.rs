use std::path::Path;

use serde::Serialize;

use super::{MicrolensError, Observables};
use crate::units::{self, Unit};

#[derive(Serialize, Debug, PartialEq)]
struct Record {
    #[serde(rename = "Time (d)")]
    time: f64,
    #[serde(rename = "Impact parameter")]
    y: f64,
    #[serde(rename = "Image position")]
    x_i: f64,
    #[serde(rename = "Counter-image position")]
    x_c: f64,
    #[serde(rename = "Image magnification")]
    m_i: Option<f64>,
    #[serde(rename = "Counter-image magnification")]
    m_c: Option<f64>,
    #[serde(rename = "Total magnification")]
    m_total: Option<f64>,
    #[serde(rename = "Centroid shift")]
    centroid_shift: f64,
    #[serde(rename = "Deviation")]
    deviation: f64,
}
impl Record {
    fn new(time: f64, obs: &Observables) -> Self {
        let magnification = obs.magnification.as_ref().ok();
        Self {
            time: units::from_canonical(time, Unit::Day),
            y: obs.y,
            x_i: obs.image_pos.0,
            x_c: obs.image_pos.1,
            m_i: magnification.map(|m| m.major),
            m_c: magnification.map(|m| m.minor),
            m_total: magnification.map(|m| m.total),
            centroid_shift: obs.centroid_shift,
            deviation: obs.deviation,
        }
    }
}

/// Microlensing observables time series
///
/// Sample `k` holds the observables at `time[k]`; the magnification of a sample is
/// either its value or the reason it could not be evaluated.
#[derive(Debug)]
pub struct LightCurve {
    time: Vec<f64>,
    samples: Vec<Observables>,
}
impl LightCurve {
    pub(super) fn new(time: Vec<f64>, samples: Vec<Observables>) -> Self {
        Self { time, samples }
    }
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
    /// Time samples [s]
    pub fn time(&self) -> &[f64] {
        &self.time
    }
    /// Impact parameter time series
    pub fn impact_parameter(&self) -> Vec<f64> {
        self.samples.iter().map(|obs| obs.y).collect()
    }
    pub fn samples(&self) -> &[Observables] {
        &self.samples
    }
    /// Iterator over the (time,observables) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Observables)> + '_ {
        self.time.iter().cloned().zip(self.samples.iter())
    }
    /// Total magnification time series, `None` for singular samples
    pub fn total_magnification(&self) -> Vec<Option<f64>> {
        self.samples
            .iter()
            .map(|obs| obs.magnification.as_ref().ok().map(|m| m.total))
            .collect()
    }
    pub fn centroid_shift(&self) -> Vec<f64> {
        self.samples.iter().map(|obs| obs.centroid_shift).collect()
    }
    /// Time [s] and value of the largest total magnification
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.time
            .iter()
            .zip(self.total_magnification())
            .filter_map(|(&t, m)| m.map(|m| (t, m)))
            .fold(None, |peak, (t, m)| match peak {
                Some((_, m_max)) if m_max >= m => peak,
                _ => Some((t, m)),
            })
    }
    /// Index and error of the samples which magnification failed
    pub fn failures(&self) -> Vec<(usize, &MicrolensError)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(k, obs)| obs.magnification.as_ref().err().map(|e| (k, e)))
            .collect()
    }
    /// Writes the light curve to a CSV file, leaving the magnifications of failed samples empty
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), csv::Error> {
        log::info!("Writing light curve to {:?}", path.as_ref());
        let mut wtr = csv::Writer::from_path(path)?;
        for (t, obs) in self.iter() {
            wtr.serialize(Record::new(t, obs))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        microlensing::{MicrolensEvent, PointLens},
        units::{Quantity, DAY},
    };
    use approx::assert_relative_eq;

    fn event(beta_0: f64, days: &[f64]) -> MicrolensEvent {
        let lens = PointLens::new(
            Quantity::new(0.3, Unit::SolarMass),
            Quantity::new(6., Unit::Kiloparsec),
            Quantity::new(8., Unit::Kiloparsec),
        )
        .unwrap();
        MicrolensEvent::from_si(
            lens,
            beta_0 * lens.einstein_radius(),
            150e3,
            days.iter().map(|t| t * DAY).collect(),
        )
        .unwrap()
    }

    #[test]
    fn aligned_trajectory() {
        let days: Vec<f64> = (-50..=50).map(|t| t as f64).collect();
        let lc = event(0., &days).light_curve();
        assert_eq!(lc.len(), 101);
        let failures = lc.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 50);
        assert!(matches!(failures[0].1, MicrolensError::Singularity { .. }));
        assert!(lc.samples()[49].magnification.is_ok());
        assert!(lc.samples()[51].magnification.is_ok());
        // the aligned sample keeps the observables defined at y=0
        let aligned = &lc.samples()[50];
        assert_eq!(aligned.y, 0.);
        assert_eq!(aligned.image_pos, (1., -1.));
        assert_eq!(aligned.centroid_shift, 0.);
        assert_eq!(lc.centroid_shift()[50], 0.);
    }

    #[test]
    fn symmetric_and_decreasing() {
        let days: Vec<f64> = (-200..=200).map(|t| t as f64 * 0.5).collect();
        let lc = event(0.2, &days).light_curve();
        let mu: Vec<f64> = lc
            .total_magnification()
            .into_iter()
            .map(|m| m.unwrap())
            .collect();
        let n = mu.len();
        for k in 0..n / 2 {
            assert_relative_eq!(mu[k], mu[n - 1 - k], max_relative = 1e-12);
        }
        for k in n / 2..n - 1 {
            assert!(mu[k] > mu[k + 1]);
        }
        let (t_peak, mu_peak) = lc.peak().unwrap();
        assert_eq!(t_peak, 0.);
        assert_relative_eq!(mu_peak, 2.04 / (0.2 * 4.04f64.sqrt()), max_relative = 1e-9);
    }

    #[test]
    fn asymptotic_magnification() {
        let lc = event(0.5, &[-1e5, 1e5]).light_curve();
        for m in lc.total_magnification() {
            assert_relative_eq!(m.unwrap(), 1., epsilon = 1e-6);
        }
    }

    #[test]
    fn csv_export() {
        let path = std::env::temp_dir().join(format!(
            "lensing-observables_csv_export_{}.csv",
            std::process::id()
        ));
        let lc = event(0., &[-1., 0., 1.]).light_curve();
        lc.to_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Time (d),Impact parameter,Image position"));
        assert_eq!(lines[2], "0.0,0.0,1.0,-1.0,,,,0.0,0.0");
        assert_eq!(lines[1].split(',').filter(|f| f.is_empty()).count(), 0);
        std::fs::remove_file(path).unwrap();
    }
}
