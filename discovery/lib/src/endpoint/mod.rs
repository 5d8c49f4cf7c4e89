//! Endpoint generation and the generated call surface.
//!
//! Generation happens in two passes. The discovery document is first loaded
//! into a typed [`DiscoverySchema`](crate::schema::DiscoverySchema); then
//! [`generate`] indexes every method by its dotted path into a
//! [`DispatchTable`]. The resulting [`EndpointFactory`] builds any number of
//! independent [`Endpoint`]s, each with its own client-scope defaults.
//!
//! An [`Endpoint`] exposes no way to add, remove or replace resources and
//! methods after it is built.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use discovery::{ClientOptions, generate_from_value};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = generate_from_value(&json!({
//!     "rootUrl": "https://www.googleapis.com/",
//!     "servicePath": "drive/v3/",
//!     "resources": {"files": {"methods": {"get": {
//!         "path": "files/{fileId}",
//!         "httpMethod": "GET",
//!         "parameterOrder": ["fileId"],
//!         "parameters": {"fileId": {"location": "path", "required": true}}
//!     }}}}
//! }))?;
//!
//! let drive = factory.build(Arc::new(ClientOptions::new()), ClientOptions::new().auth("api-key"))?;
//! let files = drive.resource("files").ok_or("no files resource")?;
//! let file = files
//!     .method("get")
//!     .ok_or("no files.get")?
//!     .call(json!({"fileId": "abc"}))
//!     .await?;
//! println!("{:?}", file.body);
//! # Ok(())
//! # }
//! ```

mod generator;
mod handle;

pub use generator::{DispatchTable, EndpointFactory, generate, generate_from_value};
pub use handle::{Endpoint, MethodHandle, ResourceHandle};
