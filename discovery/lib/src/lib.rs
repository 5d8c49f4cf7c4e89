//! Callable REST clients generated from API discovery documents.
//!
//! The `discovery` crate reads a discovery document (the JSON description of
//! an API's resources, methods and base URLs) and generates an [`Endpoint`]
//! whose nested resources and methods mirror the document.
//!
//! ## Features
//!
//! - **Generated call surface**: navigate `endpoint.resource("files")?.method("get")?`
//!   or dispatch by path with `endpoint.dispatch(&["files", "get"], args)`
//! - **Scoped defaults**: parameters, auth, headers and timeouts merge
//!   global < client < call
//! - **Uploads**: simple media and `multipart/related` uploads, streamed or literal
//! - **Uniform errors**: API error envelopes normalized into [`NormalizedError`]
//! - **Tracing**: every call runs in an `api_request` span
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use discovery::{Auth, CallArgs, ClientOptions, DiscoverySchema, generate};
//!
//! let schema = DiscoverySchema::from_json(&std::fs::read_to_string("drive.json")?)?;
//! let factory = generate(&schema);
//!
//! let global = Arc::new(ClientOptions::new().param("prettyPrint", false));
//! let drive = factory.build(global, ClientOptions::new().auth(Auth::from_env(&["DRIVE_API_KEY"]).unwrap()))?;
//!
//! let file = drive
//!     .method("files.get")
//!     .unwrap()
//!     .call(CallArgs::new().param("fileId", "abc"))
//!     .await?;
//! ```

pub mod auth;
pub mod compose;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod media;
pub mod method;
pub mod params;
pub mod response;
pub mod schema;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use auth::Auth;
pub use compose::UploadMode;
pub use config::{ClientOptions, TransportOptions};
pub use endpoint::{
    DispatchTable, Endpoint, EndpointFactory, MethodHandle, ResourceHandle, generate,
    generate_from_value,
};
pub use error::{
    ApiError, DispatchError, NormalizedError, SchemaError, TransportError, ValidationError,
};
pub use media::{Media, MediaBody};
pub use method::RestMethod;
pub use params::{CallArgs, Params};
pub use response::ApiResponse;
pub use schema::{DiscoverySchema, MethodDescriptor};
pub use transport::{HttpTransport, RawResponse, Transport, TransportRequest};
