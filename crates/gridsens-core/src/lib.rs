//! # gridsens-core: Grid data model for sensitivity analysis
//!
//! The static records the sensitivity engine reads: buses identified by name
//! and branches connecting two buses through a series impedance. Market data
//! (bids, offers, time series) lives elsewhere; only the fields the DC
//! linearization needs are modelled here.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridsens_core::*;
//!
//! let buses = vec![Bus::new("North", Kilovolts(230.0)), Bus::new("South", Kilovolts(230.0))];
//!
//! let line = Branch::new("N-S", "North", "South", 0.01, 0.1).monitored();
//! let xfmr = Branch::new("N-S tx", "North", "South", 0.0, 0.2)
//!     .with_tap(0.98)
//!     .with_phase_shift(Degrees(2.0).to_radians());
//!
//! assert!(!line.is_transformer());
//! assert!(xfmr.is_transformer());
//!
//! let report = validate_network(&buses, &[line, xfmr]);
//! assert!(!report.has_errors());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - [`GridError`] and its [`ErrorKind`] categories
//! - [`index`] - [`NameIndex`], the ordered name → position lookup
//! - [`diagnostics`] - collected warnings/errors from pre-flight checks
//! - [`validate`] - [`validate_network`] pre-flight checks
//! - [`topology`] - island detection over the bus/branch graph
//! - [`units`] - voltage and angle newtypes

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod index;
pub mod topology;
pub mod units;
pub mod validate;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{ErrorKind, GridError, GridResult};
pub use index::NameIndex;
pub use topology::{find_islands, IslandAnalysis};
pub use units::{Degrees, Kilovolts, Radians};
pub use validate::validate_network;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bus {
    /// Unique name; also the PTDF column key.
    pub name: String,
    /// Nominal voltage
    pub base_kv: Kilovolts,
}

impl Bus {
    pub fn new(name: impl Into<String>, base_kv: Kilovolts) -> Self {
        Self {
            name: name.into(),
            base_kv,
        }
    }
}

/// A line or transformer between two buses.
///
/// Presence of `tap` or `phase_shift` marks the branch a transformer; a
/// branch with neither is a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique name; also the PTDF/LODF row key.
    pub name: String,
    pub from_bus: String,
    pub to_bus: String,
    /// Series resistance (per-unit)
    pub resistance: f64,
    /// Series reactance (per-unit)
    pub reactance: f64,
    /// Flow limits on this branch are enforced downstream
    #[serde(default)]
    pub monitored: bool,
    /// Off-nominal turns ratio (dimensionless)
    #[serde(default)]
    pub tap: Option<f64>,
    /// Phase shift angle
    #[serde(default)]
    pub phase_shift: Option<Radians>,
}

impl Default for Branch {
    fn default() -> Self {
        Self {
            name: String::new(),
            from_bus: String::new(),
            to_bus: String::new(),
            resistance: 0.0,
            reactance: 0.0,
            monitored: false,
            tap: None,
            phase_shift: None,
        }
    }
}

impl Branch {
    pub fn new(
        name: impl Into<String>,
        from_bus: impl Into<String>,
        to_bus: impl Into<String>,
        resistance: f64,
        reactance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            from_bus: from_bus.into(),
            to_bus: to_bus.into(),
            resistance,
            reactance,
            ..Self::default()
        }
    }

    /// Mark the branch as monitored.
    pub fn monitored(mut self) -> Self {
        self.monitored = true;
        self
    }

    pub fn with_tap(mut self, tap: f64) -> Self {
        self.tap = Some(tap);
        self
    }

    pub fn with_phase_shift(mut self, angle: Radians) -> Self {
        self.phase_shift = Some(angle);
        self
    }

    pub fn is_transformer(&self) -> bool {
        self.tap.is_some() || self.phase_shift.is_some()
    }

    /// Tap ratio and phase shift with defaults filled in (1.0, 0 rad), or
    /// `None` for a line.
    pub fn transformer_setting(&self) -> Option<(f64, Radians)> {
        if !self.is_transformer() {
            return None;
        }
        Some((
            self.tap.unwrap_or(1.0),
            self.phase_shift.unwrap_or(Radians::ZERO),
        ))
    }
}
