//! # gridsens-algo: DC sensitivity factors for transmission networks
//!
//! Computes the linear sensitivities that security-constrained dispatch and
//! contingency screening are built on:
//!
//! | Factor | Shape | Meaning |
//! |--------|-------|---------|
//! | [`PtdfMatrix`] | branches × buses | flow change per unit injected at a bus |
//! | [`LodfMatrix`] | branches × outages | flow change per unit of pre-outage flow on a tripped branch |
//!
//! ## Pipeline
//!
//! 1. [`sparse::IncidenceBuilder`] turns bus/branch records into a sparse
//!    branch × bus incidence matrix.
//! 2. [`sparse::susceptance`] gives each line or transformer its series
//!    susceptance.
//! 3. [`sensitivity::compute_ptdf`] assembles the reduced admittance matrix
//!    and inverts it with [`linalg::BlockInverter`], which partitions
//!    anything larger than the configured block size.
//! 4. [`contingency::compute_lodf`] derives LODFs for a multi-branch outage
//!    from the PTDF.
//!
//! [`GridSystem`] wraps a network for a day-ahead or real-time horizon and
//! caches its PTDF.
//!
//! ## Example
//!
//! ```
//! use gridsens_algo::{compute_lodf, compute_ptdf, SensitivityConfig};
//! use gridsens_core::{Branch, Bus, Kilovolts};
//!
//! let buses = vec![
//!     Bus::new("A", Kilovolts(138.0)),
//!     Bus::new("B", Kilovolts(138.0)),
//!     Bus::new("C", Kilovolts(138.0)),
//! ];
//! let branches = vec![
//!     Branch::new("A-B", "A", "B", 0.0, 0.1),
//!     Branch::new("B-C", "B", "C", 0.0, 0.2),
//!     Branch::new("A-C", "A", "C", 0.0, 0.25),
//! ];
//!
//! let ptdf = compute_ptdf(&buses, &branches, &SensitivityConfig::default())?;
//! assert_eq!(ptdf.get("A-B", "A"), Some(0.0));
//!
//! let lodf = compute_lodf(&buses, &branches, &ptdf, &["A-B"])?;
//! assert!((lodf.get("A-C", "A-B").unwrap() - 1.0).abs() < 1e-9);
//! # Ok::<(), gridsens_algo::SensitivityError>(())
//! ```

pub mod config;
pub mod contingency;
pub mod error;
pub mod linalg;
pub mod sensitivity;
pub mod sparse;
pub mod system;
pub mod test_utils;

pub use config::SensitivityConfig;
pub use contingency::{compute_lodf, LodfMatrix};
pub use error::SensitivityError;
pub use linalg::{invert, BlockInverter, InversionError, DEFAULT_BLOCK_SIZE};
pub use sensitivity::{compute_ptdf, PtdfMatrix};
pub use sparse::{IncidenceBuilder, IncidenceMatrix, SusceptanceError};
pub use system::{DayAheadSystem, GridData, GridSystem, Market, RealTimeSystem};
