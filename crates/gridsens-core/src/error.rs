//! Unified error type for the sensitivity engine.
//!
//! Every failure the engine can report falls into one of three categories:
//! bad configuration (unknown reference bus, ambiguous name index), bad input
//! data (a branch pointing at a bus that does not exist), or a numerical
//! failure (zero impedance, singular matrix). Module-level error enums in
//! `gridsens-algo` classify themselves into the same [`ErrorKind`] and convert
//! into [`GridError`] at API boundaries.
//!
//! # Example
//!
//! ```
//! use gridsens_core::{ErrorKind, GridError, GridResult};
//!
//! fn pick_reference(name: &str) -> GridResult<usize> {
//!     Err(GridError::Configuration(format!("reference bus '{name}' not found")))
//! }
//!
//! let err = pick_reference("Bus 99").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Configuration);
//! ```

use thiserror::Error;

/// Category of a failure. None of them are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied settings are inconsistent with the input.
    Configuration,
    /// Input records reference each other inconsistently.
    Data,
    /// A matrix could not be formed or inverted.
    Numerical,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Data => "data",
            ErrorKind::Numerical => "numerical",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::Configuration(_) => ErrorKind::Configuration,
            GridError::Data(_) => ErrorKind::Data,
            GridError::Numerical(_) => ErrorKind::Numerical,
        }
    }

    /// Build an error of the given category.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Configuration => GridError::Configuration(message),
            ErrorKind::Data => GridError::Data(message),
            ErrorKind::Numerical => GridError::Numerical(message),
        }
    }
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;
