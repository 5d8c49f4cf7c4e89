//! The request composer.
//!
//! Chooses how the body is encoded, renders the URL, and turns a
//! [`PreparedRequest`] into the [`TransportRequest`] handed to a
//! [`Transport`](crate::transport::Transport).

use serde_json::{Value, json};
use tracing::debug;

use crate::config::{TransportOptions, merge_headers};
use crate::params::{Params, PreparedRequest, strip_path_params};
use crate::template::{self, value_to_string};
use crate::transport::{BodyPart, RequestBody, TransportRequest};

const JSON_MIME: &str = "application/json";

/// How the body of a call is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum UploadMode {
    /// JSON resource body, or none.
    Plain,
    /// A single raw media body, `uploadType=media`.
    #[strum(serialize = "media")]
    Simple,
    /// JSON metadata plus media, `uploadType=multipart`.
    Multipart,
}

/// Picks the upload mode for a prepared call.
///
/// Upload modes need an upload URL; media sent to a method without one is
/// encoded as a plain call.
pub fn upload_mode(prepared: &PreparedRequest) -> UploadMode {
    let can_upload = prepared.method.upload_url_template().is_some();
    match (&prepared.media, &prepared.resource) {
        (Some(_), Some(_)) if can_upload => UploadMode::Multipart,
        (Some(_), None) if can_upload => UploadMode::Simple,
        _ => UploadMode::Plain,
    }
}

/// Composes the wire request.
///
/// `defaults` are the transport options of the global and client scopes,
/// already merged; headers carried by the call override them by name.
pub fn compose(prepared: PreparedRequest, defaults: &TransportOptions) -> TransportRequest {
    let mode = upload_mode(&prepared);
    let PreparedRequest {
        method,
        mut params,
        media,
        resource,
        headers: call_headers,
        ..
    } = prepared;

    let url = match (mode, method.upload_url_template()) {
        (UploadMode::Simple | UploadMode::Multipart, Some(upload)) => {
            template::render(upload, &params)
        }
        _ => template::render(method.url_template(), &params),
    };
    strip_path_params(&mut params, &method);

    let mut headers = Vec::new();
    let body = match (mode, media, resource) {
        (UploadMode::Multipart, Some(media), Some(resource)) => {
            params.insert("uploadType".to_string(), Value::from(mode.to_string()));
            let content_type = media.content_type(resource.get("mimeType").and_then(Value::as_str));
            RequestBody::Multipart(vec![
                BodyPart {
                    content_type: JSON_MIME.to_string(),
                    body: resource.to_string().into(),
                },
                BodyPart {
                    content_type,
                    body: media.body,
                },
            ])
        }
        (UploadMode::Simple, Some(media), _) => {
            params.insert("uploadType".to_string(), Value::from(mode.to_string()));
            headers.push(("Content-Type".to_string(), media.content_type(None)));
            RequestBody::Media(media.body)
        }
        (_, media, resource) => {
            if media.is_some() {
                debug!(method = method.id(), "Method has no upload path, ignoring media");
            }
            match resource {
                Some(resource) => RequestBody::Json(resource),
                None if method.http_method().reads_without_body() => RequestBody::None,
                None => RequestBody::Json(json!({})),
            }
        }
    };

    let call_headers = merge_headers(&call_headers, &headers);
    let options = defaults.merge(&TransportOptions {
        headers: call_headers,
        timeout: None,
    });

    TransportRequest {
        method: method.http_method(),
        url,
        headers: options.headers,
        query: query_pairs(&params),
        body,
        timeout: options.timeout,
    }
}

/// Flattens parameters into query pairs.
///
/// `null` values are skipped and arrays become repeated keys.
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter_map(value_to_string)
                    .map(|item| (key.clone(), item)),
            ),
            other => {
                if let Some(item) = value_to_string(other) {
                    pairs.push((key.clone(), item));
                }
            }
        }
    }
    pairs
}
