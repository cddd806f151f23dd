// Verification report model
// A status/scope pair with an ordered error sequence, built through ReportBuilder.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VerificationError;

/// Which kind of verification was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Static validation of the configuration map against the scheme catalog.
    Parameters,
    /// Live probe of the configured component.
    Connectivity,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Parameters => "parameters",
            Scope::Connectivity => "connectivity",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No defects found.
    Ok,
    /// At least one classified defect, or an internal failure.
    Error,
    /// The requested scope is not implemented by this verifier.
    Unsupported,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
            Status::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable outcome of one verification pass.
///
/// An error status always comes with at least one error, and the scope is
/// always the one the caller requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    status: Status,
    scope: Scope,
    errors: Vec<VerificationError>,
}

impl Report {
    /// Start building a report for the given scope.
    pub fn builder(status: Status, scope: Scope) -> ReportBuilder {
        ReportBuilder::new(status, scope)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Classified errors in the order they were appended.
    pub fn errors(&self) -> &[VerificationError] {
        &self.errors
    }

    /// True when the verification found no defects.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Plain-text rendering, one numbered line per error.
    pub fn summary(&self) -> String {
        let mut out = format!("{} verification: {}\n", self.scope, self.status);
        for (i, error) in self.errors.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        out
    }
}

/// Accumulates errors before finalizing an immutable [`Report`].
#[derive(Debug)]
pub struct ReportBuilder {
    status: Status,
    scope: Scope,
    errors: Vec<VerificationError>,
}

impl ReportBuilder {
    pub fn new(status: Status, scope: Scope) -> Self {
        Self {
            status,
            scope,
            errors: Vec::new(),
        }
    }

    /// Append a classified error. Any appended error makes the final status
    /// [`Status::Error`], whatever the builder started with.
    pub fn error(mut self, error: VerificationError) -> Self {
        self.status = Status::Error;
        self.errors.push(error);
        self
    }

    /// Append a batch of errors, preserving their order.
    pub fn errors(mut self, errors: impl IntoIterator<Item = VerificationError>) -> Self {
        for error in errors {
            self.status = Status::Error;
            self.errors.push(error);
        }
        self
    }

    pub fn build(self) -> Report {
        debug_assert!(
            self.status != Status::Error || !self.errors.is_empty(),
            "an error report must carry at least one error"
        );
        Report {
            status: self.status,
            scope: self.scope,
            errors: self.errors,
        }
    }
}
