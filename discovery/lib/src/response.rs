//! Response normalization.

use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, NormalizedError};
use crate::params::is_truthy;
use crate::transport::RawResponse;

/// A successful call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The parsed JSON body; `None` for an empty or unparseable body.
    pub body: Option<Value>,
    /// The response as received.
    pub response: RawResponse,
}

impl ApiResponse {
    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

/// Converts a raw response into a success body or a [`NormalizedError`].
///
/// Rules, first match wins:
///
/// 1. A JSON body with a truthy `error` field and a status other than 200
///    is an application error. The message comes from the string itself,
///    from the `message` fields of `error.errors` joined by newlines, or
///    from `error.message`. The code is `error.code` if numeric, otherwise
///    the status.
/// 2. A 5xx status is a server error whose message is the raw body text.
/// 3. Anything else succeeds with the parsed body. A body that is not valid
///    JSON yields `None`.
///
/// ## Errors
///
/// Returns [`ApiError::Response`] for the first two cases.
pub fn normalize(raw: RawResponse) -> Result<ApiResponse, ApiError> {
    let body = parse_body(&raw);

    if raw.status != 200 {
        let envelope = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .filter(|e| is_truthy(e));
        if let Some(envelope) = envelope {
            let error = from_envelope(envelope, raw.status);
            return Err(ApiError::Response {
                error,
                response: Box::new(raw),
            });
        }
    }

    if raw.status >= 500 {
        return Err(ApiError::Response {
            error: NormalizedError::new(raw.text(), raw.status),
            response: Box::new(raw),
        });
    }

    Ok(ApiResponse { body, response: raw })
}

fn parse_body(raw: &RawResponse) -> Option<Value> {
    if raw.body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(&raw.body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(status = raw.status, error = %e, "Response body is not valid JSON");
            None
        }
    }
}

fn from_envelope(envelope: &Value, status: u16) -> NormalizedError {
    if let Value::String(message) = envelope {
        return NormalizedError::new(message.clone(), status);
    }

    let code = envelope
        .get("code")
        .and_then(Value::as_i64)
        .unwrap_or(i64::from(status));

    match envelope.get("errors").and_then(Value::as_array) {
        Some(errors) => {
            let message = errors
                .iter()
                .map(|e| e.get("message").and_then(Value::as_str).unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\n");
            NormalizedError::new(message, code).with_errors(errors.clone())
        }
        None => {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            NormalizedError::new(message, code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(status: u16, body: &str) -> NormalizedError {
        match normalize(RawResponse::new(status, body.to_string())) {
            Err(ApiError::Response { error, response }) => {
                assert_eq!(response.status, status);
                error
            }
            other => panic!("expected a response error, got {other:?}"),
        }
    }

    #[test]
    fn test_errors_array_joins_messages() {
        let error = normalized(
            404,
            r#"{"error":{"errors":[{"message":"x"},{"message":"y"}],"code":404}}"#,
        );
        assert_eq!(error.message, "x\ny");
        assert_eq!(error.code, 404);
        assert_eq!(error.errors.map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_string_error_uses_status() {
        let error = normalized(400, r#"{"error":"invalid_grant"}"#);
        assert_eq!(error, NormalizedError::new("invalid_grant", 400));
    }

    #[test]
    fn test_message_error_prefers_envelope_code() {
        let error = normalized(403, r#"{"error":{"message":"denied","code":40301}}"#);
        assert_eq!(error.message, "denied");
        assert_eq!(error.code, 40301);

        let error = normalized(403, r#"{"error":{"message":"denied"}}"#);
        assert_eq!(error.code, 403);
    }

    #[test]
    fn test_server_error_uses_raw_text() {
        let error = normalized(503, "upstream unavailable");
        assert_eq!(error.message, "upstream unavailable");
        assert_eq!(error.code, 503);
        assert!(error.is_server_error());

        assert_eq!(normalized(500, "").message, "");
    }

    #[test]
    fn test_success_passes_body_through() {
        let ok = normalize(RawResponse::new(200, r#"{"id":"abc"}"#)).unwrap();
        assert_eq!(ok.body, Some(json!({"id": "abc"})));
        assert_eq!(ok.status(), 200);
    }

    #[test]
    fn test_error_field_on_200_is_not_a_failure() {
        let ok = normalize(RawResponse::new(200, r#"{"error":"none"}"#)).unwrap();
        assert_eq!(ok.body, Some(json!({"error": "none"})));
    }

    #[test]
    fn test_falsy_error_field_is_ignored() {
        let ok = normalize(RawResponse::new(404, r#"{"error":null,"id":1}"#)).unwrap();
        assert_eq!(ok.body, Some(json!({"error": null, "id": 1})));
    }

    #[test]
    fn test_empty_and_malformed_bodies_are_none() {
        assert_eq!(normalize(RawResponse::new(204, "")).unwrap().body, None);
        assert_eq!(normalize(RawResponse::new(200, "<html>")).unwrap().body, None);
    }
}
