//! Discovery document and generation errors.

use thiserror::Error;

/// Errors raised while loading a discovery document or generating an
/// endpoint from it.
///
/// These indicate a malformed or self-contradictory document and are
/// reported before any call can be made.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid JSON or does not have the discovery shape.
    #[error("Invalid discovery document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// A required field is absent.
    #[error("Missing required field '{field}' in {scope}")]
    MissingField {
        /// The absent field.
        field: &'static str,
        /// Where it was expected (document or method path).
        scope: String,
    },

    /// A method declares an HTTP verb we cannot send.
    #[error("Unsupported HTTP method '{http_method}' for {method}")]
    UnsupportedHttpMethod {
        /// Dotted path of the offending method.
        method: String,
        /// The verb as written in the document.
        http_method: String,
    },

    /// A method and a resource share a name at the same level.
    #[error("Name conflict in '{scope}': '{name}' is both a method and a resource")]
    NameConflict {
        /// Dotted path of the level containing the conflict (empty at the root).
        scope: String,
        /// The shared name.
        name: String,
    },

    /// A URL template has unbalanced braces or an empty placeholder.
    #[error("Invalid URL template '{template}': {message}")]
    InvalidTemplate {
        /// The template as written.
        template: String,
        /// What is wrong with it.
        message: String,
    },
}

impl SchemaError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str, scope: impl Into<String>) -> Self {
        Self::MissingField {
            field,
            scope: scope.into(),
        }
    }

    /// Creates an invalid template error.
    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let err = SchemaError::missing_field("path", "files.get");
        assert_eq!(err.to_string(), "Missing required field 'path' in files.get");
    }

    #[test]
    fn test_name_conflict_display() {
        let err = SchemaError::NameConflict {
            scope: "files".to_string(),
            name: "permissions".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Name conflict in 'files': 'permissions' is both a method and a resource"
        );
    }

    #[test]
    fn test_invalid_document_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SchemaError = json_err.into();
        assert!(err.to_string().starts_with("Invalid discovery document"));
    }
}
