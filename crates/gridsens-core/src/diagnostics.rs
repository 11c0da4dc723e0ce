//! Collected warnings and errors from pre-flight checks.
//!
//! The sensitivity kernels fail fast on the first problem they hit. Before
//! running them, [`crate::validate_network`] can sweep the whole input and
//! report every issue at once; this module holds that report.
//!
//! Categories mirror [`ErrorKind`] (`"configuration"`, `"data"`,
//! `"numerical"`) plus `"topology"` for connectivity findings.
//!
//! # Example
//!
//! ```
//! use gridsens_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("topology", "network has 2 islands");
//! diag.add_error_with_entity("data", "references unknown bus 'B9'", "Line 4-9");
//!
//! diag.log();
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! assert!(diag.into_result().is_err());
//! ```

use crate::error::{ErrorKind, GridError, GridResult};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Computation can proceed but the result may surprise
    Warning,
    /// Computation would fail on this input
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    /// Bus or branch the issue is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Error category this issue maps to when escalated.
    pub fn kind(&self) -> ErrorKind {
        match self.category.as_str() {
            "configuration" => ErrorKind::Configuration,
            "numerical" | "topology" => ErrorKind::Numerical,
            _ => ErrorKind::Data,
        }
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.entity {
            Some(entity) => write!(f, "{} {} on '{}': {}", self.category, severity, entity, self.message),
            None => write!(f, "{} {}: {}", self.category, severity, self.message),
        }
    }
}

/// Issues in the order they were found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// Emit every warning as a `tracing` event; errors are left to
    /// [`into_result`](Self::into_result).
    pub fn log(&self) {
        for issue in self.warnings() {
            warn!(
                category = %issue.category,
                entity = issue.entity.as_deref().unwrap_or("-"),
                "{}",
                issue.message
            );
        }
    }

    /// Escalate the first error, if any, into a [`GridError`].
    pub fn into_result(self) -> GridResult<Diagnostics> {
        let first = self
            .errors()
            .next()
            .map(|issue| GridError::new(issue.kind(), issue.to_string()));
        match first {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}
