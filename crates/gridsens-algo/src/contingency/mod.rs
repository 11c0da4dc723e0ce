//! Contingency sensitivities.
//!
//! - **LODF (Line Outage Distribution Factor):** redistribution of flow when
//!   branches trip. `LODF[ℓ,m]` is the flow change on branch ℓ per unit of
//!   pre-outage flow on outaged branch m, with every branch in the outage set
//!   out of service together.
//!
//! Post-contingency flows then follow without re-solving the network:
//!
//! ```text
//! f_post = f_pre + LODF · f_pre[outaged]
//! ```
//!
//! ## References
//!
//! - Wood & Wollenberg, "Power Generation, Operation and Control", Ch. 9
//! - Guler, Gross & Liu, "Generalized Line Outage Distribution Factors"

pub mod lodf;

pub use lodf::{compute_lodf, LodfMatrix};
