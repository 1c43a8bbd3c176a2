use crate::{
    convergence::ConvergenceError, deflection::DeflectionError, grid::GridError,
    microlensing::MicrolensError, units::UnitsError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `convergence` module")]
    Convergence(#[from] ConvergenceError),
    #[error("Error in the `deflection` module")]
    Deflection(#[from] DeflectionError),
    #[error("Error in the `microlensing` module")]
    Microlensing(#[from] MicrolensError),
    #[error("Error in the `units` module")]
    Units(#[from] UnitsError),
    #[error("Error in the `grid` module")]
    Grid(#[from] GridError),
}
