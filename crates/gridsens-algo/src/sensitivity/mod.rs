//! Power Transfer Distribution Factors.
//!
//! `PTDF[ℓ,n]` is the change in DC flow on branch ℓ per unit injected at bus
//! n and withdrawn at the reference bus:
//!
//! ```text
//! ΔP_ℓ = Σₙ PTDF[ℓ,n] × ΔP_injection_n
//! ```
//!
//! The matrix is computed once per network and reused by dispatch, by
//! transfer studies, and by the LODF engine in [`crate::contingency`].

pub mod ptdf;

pub use ptdf::{compute_ptdf, PtdfMatrix};
