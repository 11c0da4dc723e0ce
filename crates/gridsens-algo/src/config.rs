//! Engine configuration.
//!
//! Two knobs shape a sensitivity computation: the block-inversion threshold
//! and the reference bus. Both have defaults, and a partial config
//! deserializes with the rest filled in.

use crate::error::SensitivityError;
use crate::linalg::{InversionError, DEFAULT_BLOCK_SIZE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Largest admittance matrix inverted in a single LU pass. Larger values
    /// mean fewer Schur-complement folds but bigger dense workspaces.
    pub block_size: usize,

    /// Bus whose PTDF column is pinned to zero; `None` picks the first bus.
    pub reference_bus: Option<String>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            reference_bus: None,
        }
    }
}

impl SensitivityConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_reference_bus(mut self, bus: impl Into<String>) -> Self {
        self.reference_bus = Some(bus.into());
        self
    }

    pub fn validate(&self) -> Result<(), SensitivityError> {
        if self.block_size == 0 {
            return Err(InversionError::ZeroBlockSize.into());
        }
        Ok(())
    }
}
