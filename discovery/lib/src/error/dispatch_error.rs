//! Dispatch table lookup errors.

use thiserror::Error;

/// Errors raised when a method path does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No method is registered under the dotted path.
    #[error("Unknown method: {path}")]
    UnknownMethod {
        /// The dotted method path that was requested (e.g. `files.get`).
        path: String,
    },
}
