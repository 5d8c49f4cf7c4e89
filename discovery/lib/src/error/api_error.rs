//! Top-level API error type.

use thiserror::Error;

use super::{DispatchError, NormalizedError, SchemaError, TransportError, ValidationError};
use crate::transport::RawResponse;

/// Top-level error type for all generated API calls.
///
/// Every failure of a call surfaces exactly once through this type. Nothing
/// is retried internally.
///
/// ## Examples
///
/// ```rust,ignore
/// use discovery::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Validation(e) => eprintln!("Bad call: {e}"),
///         ApiError::Transport(e) => eprintln!("Network error: {e}"),
///         ApiError::Response { error, .. } => eprintln!("API said {}: {}", error.code, error.message),
///         ApiError::Dispatch(e) => eprintln!("No such method: {e}"),
///         ApiError::Schema(e) => eprintln!("Bad discovery document: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// The discovery document could not be turned into an endpoint.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The call was rejected before any request was composed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a recognizable error envelope or a server failure.
    #[error("{error}")]
    Response {
        /// The error in its uniform shape.
        error: NormalizedError,
        /// The response the error was read from.
        response: Box<RawResponse>,
    },

    /// A method path did not resolve against the dispatch table.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ApiError {
    /// Returns the HTTP status code if the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { response, .. } => Some(response.status),
            Self::Transport(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns the raw response the error was read from, if any.
    pub fn raw_response(&self) -> Option<&RawResponse> {
        match self {
            Self::Response { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the normalized error for application failures.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Response { error, .. } => Some(error),
            _ => None,
        }
    }
}
