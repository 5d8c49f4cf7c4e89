//! Generated endpoints and the handles used to navigate and call them.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, Span, error, instrument};

use super::generator::DispatchTable;
use crate::compose::compose;
use crate::config::ClientOptions;
use crate::error::{ApiError, DispatchError};
use crate::params::{CallArgs, CallContext, prepare};
use crate::response::{ApiResponse, normalize};
use crate::schema::{DiscoverySchema, MethodDescriptor, ResourceNode};
use crate::transport::Transport;

/// A generated API client.
///
/// Clones share the same client; there is no way to change its resources,
/// methods or options once built.
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<EndpointInner>,
}

struct EndpointInner {
    schema: Arc<DiscoverySchema>,
    table: Arc<DispatchTable>,
    global: Arc<ClientOptions>,
    options: ClientOptions,
    http: Arc<dyn Transport>,
}

impl Endpoint {
    pub(super) fn new(
        schema: Arc<DiscoverySchema>,
        table: Arc<DispatchTable>,
        global: Arc<ClientOptions>,
        options: ClientOptions,
        http: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(EndpointInner {
                schema,
                table,
                global,
                options,
                http,
            }),
        }
    }

    /// Returns the top level of the generated tree.
    pub fn root(&self) -> ResourceHandle<'_> {
        ResourceHandle {
            endpoint: self,
            node: self.inner.schema.root(),
            path: String::new(),
        }
    }

    /// Returns a top-level resource.
    pub fn resource(&self, name: &str) -> Option<ResourceHandle<'_>> {
        self.root().resource(name)
    }

    /// Returns a method by dotted path, e.g. `files.permissions.list`.
    pub fn method(&self, path: &str) -> Option<MethodHandle> {
        self.inner
            .table
            .get(path)
            .map(|descriptor| MethodHandle::new(self.clone(), Arc::clone(descriptor)))
    }

    /// Calls a method by path segments.
    ///
    /// ## Errors
    ///
    /// Returns [`DispatchError::UnknownMethod`] if the path names no method,
    /// otherwise whatever the call itself returns.
    pub async fn dispatch(
        &self,
        segments: &[&str],
        args: impl Into<CallArgs>,
    ) -> Result<ApiResponse, ApiError> {
        let descriptor = self
            .inner
            .table
            .resolve(segments)
            .ok_or_else(|| DispatchError::UnknownMethod {
                path: segments.join("."),
            })?;
        MethodHandle::new(self.clone(), Arc::clone(descriptor))
            .call(args)
            .await
    }

    /// Iterates the dotted path of every method.
    pub fn method_paths(&self) -> impl Iterator<Item = &str> {
        self.inner.table.paths()
    }

    /// Returns the schema this endpoint was generated from.
    pub fn schema(&self) -> &DiscoverySchema {
        &self.inner.schema
    }

    /// Returns this client's defaults.
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Returns the defaults shared with every other client.
    pub fn global_options(&self) -> &Arc<ClientOptions> {
        &self.inner.global
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("api", &self.inner.schema.name())
            .field("methods", &self.inner.table.len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// A namespace within an [`Endpoint`].
#[derive(Debug, Clone)]
pub struct ResourceHandle<'a> {
    endpoint: &'a Endpoint,
    node: &'a ResourceNode,
    path: String,
}

impl<'a> ResourceHandle<'a> {
    /// Returns a nested resource.
    pub fn resource(&self, name: &str) -> Option<ResourceHandle<'a>> {
        let node = self.node.resource(name)?;
        Some(ResourceHandle {
            endpoint: self.endpoint,
            node,
            path: qualify(&self.path, name),
        })
    }

    /// Returns a method of this resource.
    pub fn method(&self, name: &str) -> Option<MethodHandle> {
        let descriptor = self.node.method(name)?;
        Some(MethodHandle::new(
            self.endpoint.clone(),
            Arc::clone(descriptor),
        ))
    }

    /// Iterates the names of this resource's methods.
    pub fn method_names(&self) -> impl Iterator<Item = &'a str> {
        self.node.methods().map(|(name, _)| name)
    }

    /// Iterates the names of nested resources.
    pub fn resource_names(&self) -> impl Iterator<Item = &'a str> {
        self.node.resources().map(|(name, _)| name)
    }

    /// Returns the dotted path of this resource; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// A callable method bound to its endpoint.
#[derive(Debug, Clone)]
pub struct MethodHandle {
    endpoint: Endpoint,
    descriptor: Arc<MethodDescriptor>,
}

impl MethodHandle {
    fn new(endpoint: Endpoint, descriptor: Arc<MethodDescriptor>) -> Self {
        Self {
            endpoint,
            descriptor,
        }
    }

    /// Returns the method's descriptor.
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// Calls the method.
    ///
    /// Required parameters are checked before anything is sent; a call that
    /// fails validation issues no request. Exactly one request is sent
    /// otherwise, through the resolved auth client if there is one and the
    /// endpoint's bare transport if not.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - A required parameter is missing
    /// - The transport fails before a response is received
    /// - The API answers with an error envelope or a 5xx status
    #[instrument(
        name = "api_request",
        skip(self, args),
        fields(
            api.method = %self.descriptor.id(),
            http.method = %self.descriptor.http_method(),
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn call(&self, args: impl Into<CallArgs>) -> Result<ApiResponse, ApiError> {
        let inner = &self.endpoint.inner;
        let context = CallContext {
            global: &inner.global,
            client: &inner.options,
        };
        let mut prepared = prepare(args, &self.descriptor, &context)?;

        let transport = prepared
            .auth_client
            .take()
            .unwrap_or_else(|| Arc::clone(&inner.http));
        let defaults = inner.global.transport.merge(&inner.options.transport);
        let request = compose(prepared, &defaults);

        Span::current().record("http.url", request.url.as_str());

        let raw = match transport.request(request).await {
            Ok(raw) => raw,
            Err(e) => {
                Span::current().record("otel.status_code", "ERROR");
                return Err(e.into());
            }
        };

        let status = raw.status;
        Span::current().record("http.status_code", status);

        let result = normalize(raw);
        let otel_status = match (&result, status) {
            (Ok(_), _) => "OK",
            (Err(_), 500..) => "ERROR",
            (Err(_), _) => "UNSET",
        };
        Span::current().record("otel.status_code", otel_status);
        result
    }

    /// Calls the method in the background, logging any failure.
    ///
    /// Errors are never returned to the caller. The task runs in the caller's
    /// span. Must be called from within a Tokio runtime.
    pub fn spawn(&self, args: impl Into<CallArgs>) -> JoinHandle<()> {
        let handle = self.clone();
        let args = args.into();
        tokio::spawn(async move {
            if let Err(e) = handle.call(args).await {
                error!(method = handle.descriptor.id(), error = %e, "API call failed");
            }
        }
        .in_current_span())
    }
}
