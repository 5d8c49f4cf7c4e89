//! Authentication for generated calls.
//!
//! An [`Auth`] is either a literal API key, sent as the `key` query
//! parameter, or an authenticated client that takes over dispatch of the
//! composed request. Token acquisition and refresh live entirely inside such
//! a client.

use std::fmt;
use std::sync::Arc;

use crate::transport::Transport;

/// Authentication applied to a call.
///
/// ## Examples
///
/// ```
/// use discovery::Auth;
///
/// let auth: Auth = "my-api-key".into();
/// assert!(auth.is_api_key());
/// ```
#[derive(Clone)]
pub enum Auth {
    /// An API key injected as the `key` query parameter.
    ApiKey(String),
    /// A client that sends the composed request with its own credentials.
    Client(Arc<dyn Transport>),
}

impl Auth {
    /// Wraps an authenticated client.
    pub fn client(client: impl Transport + 'static) -> Self {
        Self::Client(Arc::new(client))
    }

    /// Reads an API key from the first environment variable that is set.
    ///
    /// Returns `None` if none of them are.
    pub fn from_env(vars: &[&str]) -> Option<Self> {
        vars.iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
            .map(Self::ApiKey)
    }

    /// Returns `true` if this is an API key.
    pub fn is_api_key(&self) -> bool {
        matches!(self, Self::ApiKey(_))
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Client(_) => f.write_str("Client(..)"),
        }
    }
}

impl From<&str> for Auth {
    fn from(key: &str) -> Self {
        Self::ApiKey(key.to_string())
    }
}

impl From<String> for Auth {
    fn from(key: String) -> Self {
        Self::ApiKey(key)
    }
}

impl From<Arc<dyn Transport>> for Auth {
    fn from(client: Arc<dyn Transport>) -> Self {
        Self::Client(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let auth = Auth::from("secret");
        assert_eq!(format!("{auth:?}"), "ApiKey(***)");
    }

    #[test]
    fn test_from_env_takes_first_set_var() {
        // SAFETY: Tests run in isolation, setting env vars is safe here
        unsafe {
            std::env::set_var("DISCOVERY_TEST_SECOND_KEY", "from-second");
        }
        let auth = Auth::from_env(&["DISCOVERY_TEST_UNSET_KEY", "DISCOVERY_TEST_SECOND_KEY"]);
        assert!(matches!(auth, Some(Auth::ApiKey(ref k)) if k == "from-second"));
        assert!(Auth::from_env(&["DISCOVERY_TEST_UNSET_KEY"]).is_none());
    }
}
