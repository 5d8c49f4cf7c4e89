//! HTTP client and network errors.

use thiserror::Error;

/// Errors from below the HTTP layer.
///
/// These are passed through to the caller unmodified; no retry is attempted.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed due to a network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The rendered request URL could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The URL as rendered.
        url: String,
        /// The parser's complaint.
        #[source]
        source: url::ParseError,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader {
        /// The header name as supplied.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// A custom transport failed to reach the server.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }

    /// Returns the HTTP status code if the underlying client reported one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_display() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = TransportError::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid URL 'not a url'"));
        assert!(!err.is_timeout());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_invalid_header_display() {
        let err = TransportError::InvalidHeader {
            name: "bad header".to_string(),
            message: "invalid HTTP header name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid header 'bad header': invalid HTTP header name"
        );
    }
}
