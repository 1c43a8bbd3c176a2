//! Point-lens microlensing
//!
//! Prints the microlensing observables of a source at a given separation from the lens
//! and, if a transverse velocity is given, the light curve of the source moving behind the lens.

use std::path::PathBuf;

use anyhow::Context;
use lensing_observables::{
    units::{self, Unit},
    Microlens, MicrolensEvent, PointLens, Quantity,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "microlens", about = "Point-lens microlensing observables")]
struct Opt {
    /// Lens mass, e.g. "1 solMass"
    #[structopt(short, long, default_value = "1 solMass")]
    mass: Quantity,
    /// Observer to lens distance, e.g. "4 kpc"
    #[structopt(long, default_value = "4 kpc")]
    lens_distance: Quantity,
    /// Observer to source distance, e.g. "8 kpc"
    #[structopt(long, default_value = "8 kpc")]
    source_distance: Quantity,
    /// Source-lens angular separation (closest approach if a velocity is given)
    #[structopt(short, long, default_value = "0.1 mas", allow_hyphen_values = true)]
    beta: Quantity,
    /// Relative transverse velocity, e.g. "200 km/s"
    #[structopt(short, long)]
    velocity: Option<Quantity>,
    /// Light curve half time window, e.g. "100 d"
    #[structopt(long, default_value = "100 d")]
    window: Quantity,
    /// Number of light curve samples
    #[structopt(short, long, default_value = "201")]
    samples: usize,
    /// Light curve output directory
    #[structopt(short, long, env = "LENSING_DATA", default_value = ".")]
    output: PathBuf,
    /// Plot the light curve (requires the `plot` feature)
    #[structopt(short, long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let lens = PointLens::new(opt.mass, opt.lens_distance, opt.source_distance)?;
    let star = Microlens::new(lens, opt.beta)?;

    println!("Einstein radius");
    println!(
        "{:.6} mas",
        units::from_canonical(star.einstein_radius(), Unit::Milliarcsecond)
    );
    let (x_i, x_c) = star.image_pos();
    println!("Image position (in Einstein radii)");
    println!("{:.6}", x_i);
    println!("Counterimage position (in Einstein radii)");
    println!("{:.6}", x_c);
    println!("Total magnification");
    match star.magnification() {
        Ok(mu) => println!("{:.6}", mu.total),
        Err(e) => println!("{}", e),
    }
    println!("Centroid shift (in Einstein radii)");
    println!("{:.6}", star.centroid_shift());
    println!("Deviation (in Einstein radii)");
    println!("{:.6}", star.deviation());

    let Some(velocity) = opt.velocity else {
        return Ok(());
    };

    let half_window = opt.window.to(Unit::Day)?.value;
    let n = opt.samples.max(2);
    let time: Vec<Quantity> = (0..n)
        .map(|k| {
            let t = -half_window + 2. * half_window * k as f64 / (n - 1) as f64;
            Quantity::new(t, Unit::Day)
        })
        .collect();
    let event = MicrolensEvent::new(lens, opt.beta, velocity, &time)?;
    println!("Einstein crossing time");
    println!(
        "{:.3} d",
        units::from_canonical(event.einstein_time(), Unit::Day)
    );

    let light_curve = event.light_curve();
    if let Some((t, mu)) = light_curve.peak() {
        println!("Peak magnification");
        println!("{:.6} at {:.3} d", mu, units::from_canonical(t, Unit::Day));
    }
    for (k, e) in light_curve.failures() {
        log::warn!("sample #{} at t={}s: {}", k, event.time()[k], e);
    }

    let path = opt.output.join("light_curve.csv");
    light_curve
        .to_csv(&path)
        .with_context(|| format!("failed to write {:?}", path))?;
    println!("Light curve written to {:?}", path);

    if opt.plot {
        #[cfg(feature = "plot")]
        lensing_observables::plot::light_curve(&light_curve, opt.output.join("light_curve.svg"))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        #[cfg(not(feature = "plot"))]
        log::warn!("plotting requires the `plot` feature");
    }

    Ok(())
}
