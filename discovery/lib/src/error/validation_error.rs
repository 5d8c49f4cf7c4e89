//! Per-call validation errors.

use thiserror::Error;

/// Errors detected before any request is composed.
///
/// A call that fails validation issues no network traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required parameters were absent or falsy.
    #[error("Missing required parameters: {}", .names.join(", "))]
    MissingParameters {
        /// Missing names, in the method's `parameterOrder`.
        names: Vec<String>,
    },
}

impl ValidationError {
    /// Creates a missing parameters error.
    pub fn missing(names: Vec<String>) -> Self {
        Self::MissingParameters { names }
    }

    /// Returns the missing parameter names.
    pub fn missing_names(&self) -> &[String] {
        match self {
            Self::MissingParameters { names } => names,
        }
    }
}
