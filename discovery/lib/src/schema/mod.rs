//! Discovery schema loading.
//!
//! Loading happens in two steps. The JSON document is first deserialized
//! into the loose [`document`] types, which mirror the wire format. It is
//! then walked once into the validated [`tree`]: HTTP verbs parsed, URL
//! templates checked and joined onto the document's root URL, path
//! parameters located, reserved-word escapes tabulated, and method/resource
//! name conflicts rejected.

pub mod document;
pub mod tree;

pub use document::{
    DiscoveryDocument, MediaUploadDocument, MethodDocument, ParameterDocument, ParameterLocation,
    ResourceDocument,
};
pub use tree::{DiscoverySchema, MethodDescriptor, ParameterSpec, ResourceNode};
