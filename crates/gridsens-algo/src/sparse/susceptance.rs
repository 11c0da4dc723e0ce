//! Per-branch series susceptance for the DC linearization.
//!
//! ```text
//! line:         b = -1 / x
//! transformer:  b = Im( 1 / ((r + jx) · τ · e^{jφ}) )
//! ```
//!
//! Both forms are negative for an ordinary inductive branch, so the reduced
//! admittance matrix `Aᵀ·diag(b)·A` is negative definite and the PTDF signs
//! come out of the product without further correction.

use gridsens_core::{Branch, ErrorKind};
use num_complex::Complex64;
use thiserror::Error;

/// Errors from susceptance computation. All are numerical.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SusceptanceError {
    #[error("Branch {0} has zero reactance")]
    ZeroReactance(String),

    #[error("Branch {0} has zero impedance or zero tap ratio")]
    ZeroImpedance(String),

    #[error("Branch {0} has a non-finite susceptance")]
    NonFinite(String),
}

impl SusceptanceError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Numerical
    }
}

/// Series susceptance of one branch.
pub fn branch_susceptance(branch: &Branch) -> Result<f64, SusceptanceError> {
    let b = match branch.transformer_setting() {
        None => {
            if branch.reactance == 0.0 {
                return Err(SusceptanceError::ZeroReactance(branch.name.clone()));
            }
            -1.0 / branch.reactance
        }
        Some((tap, angle)) => {
            let z = Complex64::new(branch.resistance, branch.reactance)
                * tap
                * Complex64::from_polar(1.0, angle.value());
            if z.norm() == 0.0 {
                return Err(SusceptanceError::ZeroImpedance(branch.name.clone()));
            }
            z.inv().im
        }
    };

    if !b.is_finite() {
        return Err(SusceptanceError::NonFinite(branch.name.clone()));
    }
    Ok(b)
}

/// Susceptances for `branches`, order-matched to the input.
pub fn susceptance_vector(branches: &[Branch]) -> Result<Vec<f64>, SusceptanceError> {
    branches.iter().map(branch_susceptance).collect()
}
