//! Error type for sensitivity computations.
//!
//! Each variant belongs to one of the three categories in
//! [`gridsens_core::ErrorKind`]; [`SensitivityError::kind`] reports it and the
//! `From` impl below folds everything into [`GridError`] for callers that
//! only care about the category.

use crate::linalg::InversionError;
use crate::sparse::SusceptanceError;
use gridsens_core::{ErrorKind, GridError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensitivityError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Susceptance error: {0}")]
    Susceptance(#[from] SusceptanceError),

    #[error("Matrix inversion failed: {0}")]
    Inversion(#[from] InversionError),

    #[error("Reference bus '{0}' not found")]
    ReferenceBusNotFound(String),

    #[error("Network must have at least 2 buses, got {0}")]
    TooFewBuses(usize),

    #[error("Network is split into {islands} islands; the reduced admittance matrix is singular")]
    Disconnected { islands: usize },

    #[error("PTDF bus columns do not match the bus list")]
    BusOrderMismatch,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Branch '{0}' is not a row of the PTDF matrix")]
    MissingPtdfRow(String),
}

impl SensitivityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SensitivityError::Grid(e) => e.kind(),
            SensitivityError::Susceptance(e) => e.kind(),
            SensitivityError::Inversion(e) => e.kind(),
            SensitivityError::ReferenceBusNotFound(_) => ErrorKind::Configuration,
            SensitivityError::TooFewBuses(_)
            | SensitivityError::BusOrderMismatch
            | SensitivityError::DimensionMismatch(_)
            | SensitivityError::MissingPtdfRow(_) => ErrorKind::Data,
            SensitivityError::Disconnected { .. } => ErrorKind::Numerical,
        }
    }
}

impl From<SensitivityError> for GridError {
    fn from(err: SensitivityError) -> Self {
        match err {
            SensitivityError::Grid(inner) => inner,
            other => GridError::new(other.kind(), other.to_string()),
        }
    }
}
