//! Sparse network structure for DC sensitivity analysis.
//!
//! - [`incidence`]: branch × bus incidence matrix (`sprs::CsMat`)
//! - [`susceptance`]: per-branch series susceptance for lines and transformers
//!
//! A 10,000-bus network has on the order of 15,000 branches, so the incidence
//! matrix carries two non-zeros per row out of tens of thousands of columns.
//! Everything here stays sparse; densification happens only when the reduced
//! admittance matrix is handed to [`crate::linalg`].

pub mod incidence;
pub mod susceptance;

pub use incidence::{IncidenceBuilder, IncidenceMatrix, FROM_BUS_SIGN, TO_BUS_SIGN};
pub use susceptance::{branch_susceptance, susceptance_vector, SusceptanceError};
