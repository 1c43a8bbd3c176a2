//! 2D grid storage
//!
//! Grids are [DMatrix] of `f64`, with rows along the first array axis, read from
//! and written to NumPy `.npy` files (or members of a `.npz` archive).

use std::{
    fs::File,
    io::{self, BufWriter, Read},
    path::Path,
    time::Instant,
};

use nalgebra::DMatrix;
use npyz::{npz::NpzArchive, NpyFile, Order, WriterBuilder};

#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("Failed to read or write the grid file")]
    Io(#[from] io::Error),
    #[error("expected a 2D array, found shape {0:?}")]
    Shape(Vec<u64>),
    #[error(r#"array "{0}" not found in the npz archive"#)]
    Missing(String),
}
type Result<T> = std::result::Result<T, GridError>;

fn into_matrix<R: Read>(npy: NpyFile<R>) -> Result<DMatrix<f64>> {
    let shape = npy.shape().to_vec();
    let order = npy.order();
    let (n_rows, n_cols) = match shape.as_slice() {
        &[n_rows, n_cols] => (n_rows as usize, n_cols as usize),
        _ => return Err(GridError::Shape(shape)),
    };
    let data: Vec<f64> = npy.into_vec()?;
    Ok(match order {
        Order::C => DMatrix::from_row_slice(n_rows, n_cols, &data),
        Order::Fortran => DMatrix::from_vec(n_rows, n_cols, data),
    })
}

/// Loads a 2D grid from a `.npy` file
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>> {
    let now = Instant::now();
    log::info!("Loading {:?}...", path.as_ref());
    let bytes = std::fs::read(&path)?;
    let grid = into_matrix(NpyFile::new(&bytes[..])?)?;
    log::info!(
        "... loaded {}x{} grid in {}ms",
        grid.nrows(),
        grid.ncols(),
        now.elapsed().as_millis()
    );
    Ok(grid)
}

/// Loads the 2D grid `name` from a `.npz` archive
pub fn load_npz_grid<P: AsRef<Path>>(path: P, name: &str) -> Result<DMatrix<f64>> {
    log::info!("Loading {:?}[{}]...", path.as_ref(), name);
    let mut npz = NpzArchive::open(path)?;
    let npy = npz
        .by_name(name)?
        .ok_or_else(|| GridError::Missing(name.to_string()))?;
    into_matrix(npy)
}

/// Writes a 2D grid into a `.npy` file in C order
pub fn save_grid<P: AsRef<Path>>(path: P, grid: &DMatrix<f64>) -> Result<()> {
    log::info!("Saving {}x{} grid to {:?}", grid.nrows(), grid.ncols(), path.as_ref());
    let mut buffer = BufWriter::new(File::create(path)?);
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[grid.nrows() as u64, grid.ncols() as u64])
        .writer(&mut buffer)
        .begin_nd()?;
    writer.extend(grid.transpose().iter().copied())?;
    writer.finish()?;
    Ok(())
}
