//! Default scopes for generated clients.
//!
//! There is no process-wide state. A [`ClientOptions`] value for the global
//! scope is shared (behind an `Arc`) by every endpoint built from it, and
//! each endpoint owns its own [`ClientOptions`] for the per-client scope.
//! Per-call values always win, then per-client, then global.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::auth::Auth;
use crate::params::Params;
use crate::transport::Transport;

/// Transport defaults merged ascending global < client < call.
///
/// `auth` and `params` are not transport options. They belong to the
/// parameter pipeline and never reach the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Headers sent with every request in this scope.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl TransportOptions {
    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Merges `higher` over `self`.
    ///
    /// Headers merge by name, case-insensitively; a header in `higher`
    /// replaces one of the same name in `self`. A timeout in `higher` wins.
    pub fn merge(&self, higher: &TransportOptions) -> TransportOptions {
        TransportOptions {
            headers: merge_headers(&self.headers, &higher.headers),
            timeout: higher.timeout.or(self.timeout),
        }
    }
}

/// Merges two header lists; `higher` overrides `lower` for matching names
/// (case-insensitive).
pub(crate) fn merge_headers(
    lower: &[(String, String)],
    higher: &[(String, String)],
) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = lower
        .iter()
        .filter(|(key, _)| !higher.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)))
        .cloned()
        .collect();
    result.extend(higher.iter().cloned());
    result
}

/// Defaults for one scope: parameters, auth, transport options, and
/// optionally the bare transport to dispatch unauthenticated requests with.
///
/// ## Examples
///
/// ```
/// use std::sync::Arc;
/// use discovery::ClientOptions;
///
/// let global = Arc::new(ClientOptions::new().param("prettyPrint", false));
/// let client = ClientOptions::new()
///     .auth("my-api-key")
///     .header("X-Goog-User-Project", "my-project");
/// # let _ = (global, client);
/// ```
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Default parameters.
    pub params: Params,
    /// Default authentication.
    pub auth: Option<Auth>,
    /// Transport defaults.
    pub transport: TransportOptions,
    http: Option<Arc<dyn Transport>>,
}

impl ClientOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a default parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replaces the default parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the default authentication.
    pub fn auth(mut self, auth: impl Into<Auth>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Adds a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport = self.transport.header(name, value);
        self
    }

    /// Sets the default timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.timeout(timeout);
        self
    }

    /// Sets the bare transport used when no auth client is resolved.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.http = Some(transport);
        self
    }

    /// Returns the configured bare transport, if any.
    pub fn transport_override(&self) -> Option<&Arc<dyn Transport>> {
        self.http.as_ref()
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("params", &self.params)
            .field("auth", &self.auth)
            .field("transport", &self.transport)
            .field("http", &self.http.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_headers_higher_wins_case_insensitively() {
        let lower = headers(&[("X-Trace", "global"), ("Accept", "application/json")]);
        let higher = headers(&[("x-trace", "call")]);
        assert_eq!(
            merge_headers(&lower, &higher),
            headers(&[("Accept", "application/json"), ("x-trace", "call")])
        );
    }

    #[test]
    fn test_transport_merge_keeps_lower_timeout_when_unset() {
        let global = TransportOptions::default()
            .header("X-A", "1")
            .timeout(Duration::from_secs(5));
        let client = TransportOptions::default().header("X-B", "2");
        let merged = global.merge(&client);
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert_eq!(merged.headers, headers(&[("X-A", "1"), ("X-B", "2")]));

        let merged = merged.merge(&TransportOptions::default().timeout(Duration::from_secs(1)));
        assert_eq!(merged.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_client_options_builders() {
        let options = ClientOptions::new()
            .param("alt", "json")
            .auth("k")
            .header("X-A", "1");
        assert_eq!(options.params.get("alt"), Some(&Value::from("json")));
        assert!(options.auth.as_ref().is_some_and(Auth::is_api_key));
        assert_eq!(options.transport.headers.len(), 1);
        assert!(options.transport_override().is_none());
        assert!(format!("{options:?}").contains("ApiKey(***)"));
    }
}
