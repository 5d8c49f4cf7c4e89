//! The generation pass.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::handle::Endpoint;
use crate::config::ClientOptions;
use crate::error::{SchemaError, TransportError};
use crate::schema::{DiscoverySchema, MethodDescriptor, ResourceNode};
use crate::transport::{HttpTransport, Transport};

/// Every method of a schema, keyed by dotted path (`files.permissions.list`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchTable {
    methods: BTreeMap<String, Arc<MethodDescriptor>>,
}

impl DispatchTable {
    /// Indexes every method under `root`.
    pub fn from_tree(root: &ResourceNode) -> Self {
        let mut table = Self::default();
        table.index(root);
        table
    }

    fn index(&mut self, node: &ResourceNode) {
        for (_, method) in node.methods() {
            self.methods
                .insert(method.path().to_string(), Arc::clone(method));
        }
        for (_, child) in node.resources() {
            self.index(child);
        }
    }

    /// Looks up a method by dotted path.
    pub fn get(&self, path: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(path)
    }

    /// Looks up a method by path segments.
    pub fn resolve(&self, segments: &[&str]) -> Option<&Arc<MethodDescriptor>> {
        self.get(&segments.join("."))
    }

    /// Iterates the dotted paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Returns the number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if the schema declares no methods.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Builds endpoints for one schema.
///
/// Cheap to clone; the schema and dispatch table are shared.
#[derive(Debug, Clone)]
pub struct EndpointFactory {
    schema: Arc<DiscoverySchema>,
    table: Arc<DispatchTable>,
}

impl EndpointFactory {
    /// Builds an endpoint.
    ///
    /// `global` holds the defaults shared by every client; `options` are this
    /// client's own. Unauthenticated requests go through the transport set
    /// on `options`, else the one on `global`, else a new [`HttpTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if a default HTTP transport is needed and cannot be
    /// constructed.
    pub fn build(
        &self,
        global: Arc<ClientOptions>,
        options: ClientOptions,
    ) -> Result<Endpoint, TransportError> {
        let http: Arc<dyn Transport> = match options
            .transport_override()
            .or_else(|| global.transport_override())
        {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(Endpoint::new(
            Arc::clone(&self.schema),
            Arc::clone(&self.table),
            global,
            options,
            http,
        ))
    }

    /// Returns the schema.
    pub fn schema(&self) -> &DiscoverySchema {
        &self.schema
    }

    /// Returns the dispatch table.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}

/// Indexes a loaded schema.
pub fn generate(schema: &DiscoverySchema) -> EndpointFactory {
    let table = DispatchTable::from_tree(schema.root());
    debug!(
        api = schema.name().unwrap_or_default(),
        methods = table.len(),
        "Generated endpoint"
    );
    EndpointFactory {
        schema: Arc::new(schema.clone()),
        table: Arc::new(table),
    }
}

/// Loads and indexes a discovery document given as JSON.
///
/// ## Errors
///
/// Returns a [`SchemaError`] if the document is malformed.
pub fn generate_from_value(value: &Value) -> Result<EndpointFactory, SchemaError> {
    Ok(generate(&DiscoverySchema::from_value(value)?))
}
