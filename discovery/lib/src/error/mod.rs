//! Layered error types for the discovery client.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type for every call
//! - [`SchemaError`] - Discovery document loading and generation errors
//! - [`ValidationError`] - Per-call parameter validation errors
//! - [`TransportError`] - HTTP client and network errors
//! - [`NormalizedError`] - Application errors reported by the remote API
//! - [`DispatchError`] - Dispatch table lookup errors

mod api_error;
mod dispatch_error;
mod normalized_error;
mod schema_error;
mod transport_error;
mod validation_error;

pub use api_error::ApiError;
pub use dispatch_error::DispatchError;
pub use normalized_error::NormalizedError;
pub use schema_error::SchemaError;
pub use transport_error::TransportError;
pub use validation_error::ValidationError;
