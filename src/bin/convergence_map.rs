//! Convergence maps
//!
//! Reconstructs the convergence from deflection angle maps, either read from
//! `.npy` files or computed for power-law lenses of given indices.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use lensing_observables::{convergence, grid, DeflectionModel, LensPlaneGrid, PowerLawLens};
use nalgebra::DMatrix;
use rayon::prelude::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "convergence-map", about = "Convergence maps from deflection angle maps")]
struct Opt {
    /// Power-law lens indices
    #[structopt(short, long, allow_hyphen_values = true)]
    index: Vec<f64>,
    /// Deflection angle x component map (.npy)
    #[structopt(long)]
    deflection_x: Option<PathBuf>,
    /// Deflection angle y component map (.npy)
    #[structopt(long)]
    deflection_y: Option<PathBuf>,
    /// Lens plane grid size [pixel]
    #[structopt(long, default_value = "500")]
    size: usize,
    /// Lens plane pixel scale [Einstein radius], defaults to 1/size
    #[structopt(long)]
    pixel_scale: Option<f64>,
    /// Differentiate with respect to the lens plane coordinates instead of the pixel indices
    #[structopt(long)]
    physical_spacing: bool,
    /// Physical scale factor applied to the convergence, e.g. (thetaE/D_l)^2
    #[structopt(long)]
    scale_factor: Option<f64>,
    /// Output directory
    #[structopt(short, long, env = "LENSING_DATA", default_value = ".")]
    output: PathBuf,
}

fn save_convergence(
    opt: &Opt,
    deflection_x: &DMatrix<f64>,
    deflection_y: &DMatrix<f64>,
    spacing: (f64, f64),
    output: &Path,
) -> anyhow::Result<()> {
    let mut kappa = convergence::reconstruct_with_spacing(deflection_x, deflection_y, spacing)?;
    if let Some(factor) = opt.scale_factor {
        kappa = kappa.scale(factor);
    }
    let (mean, min, max) = kappa.stats();
    log::info!(
        "{:?}: convergence mean={:.6e}, range=[{:.6e},{:.6e}]",
        output,
        mean,
        min,
        max
    );
    grid::save_grid(output.join("convergence.npy"), &kappa)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    if let (Some(x_path), Some(y_path)) = (&opt.deflection_x, &opt.deflection_y) {
        let deflection_x = grid::load_grid(x_path)
            .with_context(|| format!("failed to load {:?}", x_path))?;
        let deflection_y = grid::load_grid(y_path)
            .with_context(|| format!("failed to load {:?}", y_path))?;
        let spacing = if opt.physical_spacing {
            let pixel_scale = opt.pixel_scale.unwrap_or((opt.size as f64).recip());
            (pixel_scale, pixel_scale)
        } else {
            (1f64, 1f64)
        };
        fs::create_dir_all(&opt.output)?;
        save_convergence(&opt, &deflection_x, &deflection_y, spacing, &opt.output)?;
        println!("Convergence written to {:?}", opt.output.join("convergence.npy"));
        return Ok(());
    }

    if opt.deflection_x.is_some() || opt.deflection_y.is_some() {
        anyhow::bail!("both deflection angle component maps must be given");
    }
    if opt.index.is_empty() {
        anyhow::bail!("either power-law indices or deflection maps must be given");
    }

    let lens_plane = match opt.pixel_scale {
        Some(pixel_scale) => LensPlaneGrid::new(opt.size, opt.size).pixel_scale(pixel_scale),
        None => LensPlaneGrid::square(opt.size),
    };
    let spacing = if opt.physical_spacing {
        lens_plane.spacing()
    } else {
        (1f64, 1f64)
    };

    let pb = ProgressBar::new(opt.index.len() as u64);
    pb.set_style(ProgressStyle::default_bar());
    opt.index
        .par_iter()
        .progress_with(pb)
        .map(|&n| {
            let lens = PowerLawLens::new(n);
            let output = opt.output.join(format!("n{}", n));
            fs::create_dir_all(&output)?;
            let deflection = lens
                .deflection_map(&lens_plane)
                .with_context(|| format!("power-law lens n={}", n))?;
            grid::save_grid(output.join("deflection_x.npy"), deflection.x())?;
            grid::save_grid(output.join("deflection_y.npy"), deflection.y())?;
            save_convergence(&opt, deflection.x(), deflection.y(), spacing, &output)
        })
        .collect::<anyhow::Result<Vec<()>>>()?;
    println!("Convergence maps written to {:?}", opt.output);

    Ok(())
}
