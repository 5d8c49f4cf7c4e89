//! Wire-level requests and the transports that send them.
//!
//! [`Transport`] is the single seam between request composition and the
//! network. [`HttpTransport`] is the bare, unauthenticated implementation;
//! authenticated clients implement the same trait and are handed the same
//! [`TransportRequest`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::error::TransportError;
use crate::media::MediaBody;
use crate::method::RestMethod;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can send a composed request and return the raw response.
///
/// This trait is dyn-compatible so bare transports and authenticated
/// clients can be stored side by side as `Arc<dyn Transport>`.
///
/// ## Examples
///
/// ```rust,ignore
/// use discovery::transport::{BoxFuture, RawResponse, Transport, TransportRequest};
/// use discovery::TransportError;
///
/// struct Signed { inner: HttpTransport, token: String }
///
/// impl Transport for Signed {
///     fn request(&self, mut request: TransportRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
///         request.headers.push(("Authorization".into(), format!("Bearer {}", self.token)));
///         self.inner.request(request)
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends the request.
    fn request(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<RawResponse, TransportError>>;
}

/// The body of a composed request.
#[derive(Debug)]
pub enum RequestBody {
    /// No outgoing body; the response is still read as JSON.
    None,
    /// A JSON document.
    Json(Value),
    /// A raw media payload. The `Content-Type` is carried in the headers.
    Media(MediaBody),
    /// A `multipart/related` body, parts in send order.
    Multipart(Vec<BodyPart>),
}

/// One part of a multipart body.
#[derive(Debug)]
pub struct BodyPart {
    /// The part's content type.
    pub content_type: String,
    /// The part's payload.
    pub body: MediaBody,
}

/// A fully composed request, ready for a [`Transport`].
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP verb.
    pub method: RestMethod,
    /// Absolute URL with every placeholder substituted.
    pub url: String,
    /// Request headers, already merged across scopes.
    pub headers: Vec<(String, String)>,
    /// Query pairs. Repeated keys are sent repeatedly.
    pub query: Vec<(String, String)>,
    /// The body.
    pub body: RequestBody,
    /// Per-request timeout overriding the transport's default.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Returns the first header with the given name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first query value for the key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response before normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as received.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builder for configuring an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    default_headers: HeaderMap,
    user_agent: String,
}

impl HttpTransportBuilder {
    fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            user_agent: format!("discovery/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, TransportError> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the [`HttpTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let (_, user_agent) = header_pair(USER_AGENT.as_str(), &self.user_agent)?;
        let mut default_headers = self.default_headers;
        default_headers.entry(USER_AGENT).or_insert(user_agent);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(default_headers)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(HttpTransport { client })
    }
}

/// The bare, unauthenticated transport, built on `reqwest`.
///
/// Literal bodies are sent whole; streamed media is piped chunk by chunk,
/// including inside multipart envelopes.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a new builder.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        // The multipart boundary replaces any caller-supplied content type.
        let (json, body) = match request.body {
            RequestBody::None => (None, None),
            RequestBody::Json(value) => (Some(value), None),
            RequestBody::Media(body) => (None, Some(into_reqwest_body(body))),
            RequestBody::Multipart(parts) => {
                let boundary = uuid::Uuid::new_v4().simple().to_string();
                let (_, content_type) = header_pair(
                    CONTENT_TYPE.as_str(),
                    &format!("multipart/related; boundary={boundary}"),
                )?;
                headers.insert(CONTENT_TYPE, content_type);
                (None, Some(multipart_body(&boundary, parts)))
            }
        };

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(value) = json {
            builder = builder.json(&value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        Box::pin(self.send(request))
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let invalid = |message: String| TransportError::InvalidHeader {
        name: name.to_string(),
        message,
    };
    let header_name = HeaderName::try_from(name).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::try_from(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

fn into_reqwest_body(body: MediaBody) -> reqwest::Body {
    match body {
        MediaBody::Text(text) => reqwest::Body::from(text),
        MediaBody::Bytes(bytes) => reqwest::Body::from(bytes),
        MediaBody::Stream(stream) => reqwest::Body::wrap_stream(stream),
    }
}

/// Encodes parts as a `multipart/related` body.
///
/// Buffers when every part is literal so the length is known; otherwise the
/// envelope is streamed around the streamed parts.
fn multipart_body(boundary: &str, parts: Vec<BodyPart>) -> reqwest::Body {
    let closing = Bytes::from(format!("--{boundary}--\r\n"));

    if parts.iter().all(|part| !part.body.is_stream()) {
        let mut buf = Vec::new();
        for part in &parts {
            buf.extend_from_slice(part_head(boundary, &part.content_type).as_ref());
            buf.extend_from_slice(part.body.as_bytes().unwrap_or_default());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(&closing);
        return reqwest::Body::from(buf);
    }

    let mut chunks = Vec::with_capacity(parts.len() * 3 + 1);
    for part in parts {
        chunks.push(MediaBody::Bytes(part_head(boundary, &part.content_type)).into_stream());
        chunks.push(part.body.into_stream());
        chunks.push(MediaBody::Bytes(Bytes::from_static(b"\r\n")).into_stream());
    }
    chunks.push(MediaBody::Bytes(closing).into_stream());
    reqwest::Body::wrap_stream(stream::iter(chunks).flatten())
}

fn part_head(boundary: &str, content_type: &str) -> Bytes {
    Bytes::from(format!(
        "--{boundary}\r\nContent-Type: {content_type}\r\n\r\n"
    ))
}
