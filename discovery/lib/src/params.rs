//! The parameter pipeline.
//!
//! [`prepare`] turns the caller's arguments and the defaults of every scope
//! into a [`PreparedRequest`]: one fresh parameter snapshot per call, the
//! reserved fields pulled out of it, escaped names restored, auth resolved
//! and required parameters checked. Nothing here touches the network.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::Auth;
use crate::config::{ClientOptions, merge_headers};
use crate::error::ValidationError;
use crate::media::{Media, MediaBody};
use crate::schema::MethodDescriptor;
use crate::transport::Transport;

/// A parameter mapping, keyed by API parameter name.
pub type Params = Map<String, Value>;

/// Keys that never reach the query string.
pub const RESERVED_KEYS: [&str; 4] = ["media", "resource", "auth", "headers"];

/// Arguments for one call.
///
/// ## Examples
///
/// ```
/// use discovery::{CallArgs, Media};
/// use serde_json::json;
///
/// let args = CallArgs::new()
///     .param("fileId", "abc")
///     .resource(json!({"name": "notes.txt"}))
///     .media(Media::new("hello").with_mime_type("text/plain"));
/// # let _ = args;
/// ```
#[derive(Debug, Default)]
pub struct CallArgs {
    /// Per-call parameters.
    pub params: Params,
    /// Upload payload.
    pub media: Option<Media>,
    /// JSON request body.
    pub resource: Option<Value>,
    /// Per-call auth override.
    pub auth: Option<Auth>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl CallArgs {
    /// Creates empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the upload payload.
    pub fn media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    /// Sets the JSON request body.
    pub fn resource(mut self, resource: Value) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Overrides auth for this call.
    pub fn auth(mut self, auth: impl Into<Auth>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl From<()> for CallArgs {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Params> for CallArgs {
    fn from(params: Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }
}

impl From<Value> for CallArgs {
    /// Objects become parameters; any other value is a parameterless call.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(params) => params.into(),
            _ => Self::default(),
        }
    }
}

/// The scopes a call resolves defaults from.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Defaults shared by every client.
    pub global: &'a ClientOptions,
    /// Defaults of the calling client.
    pub client: &'a ClientOptions,
}

/// A validated call, ready for composition.
pub struct PreparedRequest {
    /// The method being called.
    pub method: Arc<MethodDescriptor>,
    /// Merged parameters, path parameters still included.
    pub params: Params,
    /// Upload payload.
    pub media: Option<Media>,
    /// JSON request body.
    pub resource: Option<Value>,
    /// Headers from the call and any `headers` parameter scope.
    pub headers: Vec<(String, String)>,
    /// The authenticated client to dispatch through, if one was resolved.
    pub auth_client: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("method", &self.method.id())
            .field("params", &self.params)
            .field("media", &self.media)
            .field("resource", &self.resource)
            .field("headers", &self.headers)
            .field("auth_client", &self.auth_client.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Runs the parameter pipeline for one call.
///
/// ## Errors
///
/// Returns [`ValidationError::MissingParameters`] listing, in
/// `parameterOrder` order, every required parameter that is absent or
/// falsy after merging.
pub fn prepare(
    args: impl Into<CallArgs>,
    method: &Arc<MethodDescriptor>,
    context: &CallContext<'_>,
) -> Result<PreparedRequest, ValidationError> {
    let args = args.into();
    let mut params = merge_scopes(&[&context.global.params, &context.client.params, &args.params]);

    let reserved = extract_reserved(&mut params);
    unalias(&mut params, method);

    let media = args.media.or(reserved.media);
    let resource = args.resource.or(reserved.resource);
    let headers = merge_headers(&reserved.headers, &args.headers);

    let auth = args
        .auth
        .or(reserved.auth)
        .or_else(|| context.client.auth.clone())
        .or_else(|| context.global.auth.clone());
    let auth_client = match auth {
        Some(Auth::ApiKey(key)) => {
            if !params.get("key").is_some_and(is_truthy) {
                params.insert("key".to_string(), Value::String(key));
            }
            None
        }
        Some(Auth::Client(client)) => Some(client),
        None => None,
    };

    let missing: Vec<String> = method
        .required_params()
        .iter()
        .filter(|name| !params.get(name.as_str()).is_some_and(is_truthy))
        .cloned()
        .collect();
    if !missing.is_empty() {
        debug!(method = method.id(), missing = ?missing, "Required parameters missing");
        return Err(ValidationError::missing(missing));
    }

    Ok(PreparedRequest {
        method: Arc::clone(method),
        params,
        media,
        resource,
        headers,
        auth_client,
    })
}

/// Merges parameter scopes, later scopes overriding earlier ones.
///
/// Returns a fresh mapping; the inputs are not modified.
pub fn merge_scopes(scopes: &[&Params]) -> Params {
    let mut merged = Params::new();
    for scope in scopes {
        for (key, value) in scope.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Reserved values found in a JSON scope.
#[derive(Debug, Default)]
struct Reserved {
    media: Option<Media>,
    resource: Option<Value>,
    auth: Option<Auth>,
    headers: Vec<(String, String)>,
}

fn extract_reserved(params: &mut Params) -> Reserved {
    let mut reserved = Reserved {
        resource: params.remove("resource").filter(|v| !v.is_null()),
        ..Reserved::default()
    };

    match params.remove("media") {
        Some(Value::Object(media)) => reserved.media = media_from_json(&media),
        Some(Value::Null) | None => {}
        Some(other) => warn!(value = %other, "Ignoring non-object media parameter"),
    }

    match params.remove("auth") {
        Some(Value::String(key)) => reserved.auth = Some(Auth::ApiKey(key)),
        Some(Value::Null) | None => {}
        Some(_) => warn!("Ignoring non-string auth parameter"),
    }

    match params.remove("headers") {
        Some(Value::Object(headers)) => {
            reserved.headers = headers
                .into_iter()
                .filter_map(|(name, value)| match value {
                    Value::String(s) => Some((name, s)),
                    Value::Null => None,
                    other => Some((name, other.to_string())),
                })
                .collect();
        }
        Some(Value::Null) | None => {}
        Some(_) => warn!("Ignoring non-object headers parameter"),
    }

    reserved
}

/// Reads `{ "body": "...", "mimeType": "..." }`.
fn media_from_json(media: &Map<String, Value>) -> Option<Media> {
    let body = match media.get("body")? {
        Value::String(text) => MediaBody::Text(text.clone()),
        Value::Null => return None,
        other => MediaBody::Text(other.to_string()),
    };
    let mut media_value = Media::new(body);
    if let Some(mime) = media.get("mimeType").and_then(Value::as_str) {
        media_value = media_value.with_mime_type(mime);
    }
    Some(media_value)
}

/// Restores escaped names using the method's escape table.
///
/// The escaped value replaces any value already merged under the plain name.
fn unalias(params: &mut Params, method: &MethodDescriptor) {
    let escaped: Vec<(String, String)> = params
        .keys()
        .filter_map(|key| method.unescape(key).map(|name| (key.clone(), name.to_string())))
        .collect();

    for (key, name) in escaped {
        if let Some(value) = params.remove(&key) {
            params.insert(name, value);
        }
    }
}

/// Removes every path-located parameter.
///
/// Run only after the URL has been rendered.
pub fn strip_path_params(params: &mut Params, method: &MethodDescriptor) {
    for name in method.path_params() {
        params.remove(name);
    }
}

/// Truthiness of a parameter value: `null`, `false`, `0` and `""` are
/// treated as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
