//! The uniform error shape for application failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An API failure normalized into one shape regardless of the origin API's
/// error envelope.
///
/// `code` is usually the HTTP status, but APIs that report their own numeric
/// code inside the envelope win over the transport status.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct NormalizedError {
    /// Human-readable error message.
    pub message: String,
    /// Numeric error code.
    pub code: i64,
    /// Individual error entries, when the API reported a list of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

impl NormalizedError {
    /// Creates an error with a message and code and no detail entries.
    pub fn new(message: impl Into<String>, code: impl Into<i64>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            errors: None,
        }
    }

    /// Attaches the detail entries.
    pub fn with_errors(mut self, errors: Vec<Value>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Returns `true` if the code is in the 5xx range.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_is_message() {
        let err = NormalizedError::new("Rate limit exceeded", 429);
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_serializes_without_empty_errors() {
        let err = NormalizedError::new("boom", 503);
        assert!(err.is_server_error());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"message": "boom", "code": 503})
        );
    }
}
