//! Light curve plots
use std::{error::Error, path::Path};

use plotters::prelude::*;

use crate::{
    microlensing::LightCurve,
    units::{self, Unit},
};

/// Plots the total magnification and the centroid shift of a light curve into a SVG file
///
/// Samples with a singular magnification are left out of the magnification panel.
pub fn light_curve<P: AsRef<Path>>(
    light_curve: &LightCurve,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let max_value = |x: &[f64]| -> f64 { x.iter().cloned().fold(f64::NEG_INFINITY, f64::max) };
    let min_value = |x: &[f64]| -> f64 { x.iter().cloned().fold(f64::INFINITY, f64::min) };

    let magnification: Vec<(f64, f64)> = light_curve
        .iter()
        .filter_map(|(t, obs)| {
            obs.magnification
                .as_ref()
                .ok()
                .map(|m| (units::from_canonical(t, Unit::Day), m.total))
        })
        .collect();
    let centroid: Vec<(f64, f64)> = light_curve
        .iter()
        .map(|(t, obs)| (units::from_canonical(t, Unit::Day), obs.centroid_shift))
        .collect();
    if centroid.is_empty() {
        log::warn!("nothing to plot, the light curve is empty");
        return Ok(());
    }
    let days: Vec<f64> = centroid.iter().map(|(t, _)| *t).collect();

    let plot = SVGBackend::new(path.as_ref(), (768, 768)).into_drawing_area();
    plot.fill(&WHITE)?;
    let (upper, lower) = plot.split_vertically(384);
    let xrange = min_value(&days)..max_value(&days);

    for (k, (area, series, label)) in [
        (&upper, &magnification, "Total magnification"),
        (&lower, &centroid, "Centroid shift [Einstein radius]"),
    ]
    .into_iter()
    .enumerate()
    {
        if series.is_empty() {
            continue;
        }
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let mut chart = ChartBuilder::on(area)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(xrange.clone(), min_value(&values)..max_value(&values))?;
        chart
            .configure_mesh()
            .x_desc("Time [d]")
            .y_desc(label)
            .draw()?;
        let color = colorous::TABLEAU10[k % colorous::TABLEAU10.len()];
        let rgb = RGBColor(color.r, color.g, color.b);
        chart.draw_series(LineSeries::new(series.iter().cloned(), &rgb))?;
    }
    plot.present()?;
    log::info!("Light curve plot written to {:?}", path.as_ref());
    Ok(())
}
