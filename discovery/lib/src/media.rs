//! Upload payloads.
//!
//! Media bodies are an explicit tagged union: the caller decides whether a
//! payload is literal text, literal bytes, or a stream that must be piped to
//! the server without buffering.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

/// Content type used for textual media without an explicit mime type.
pub const DEFAULT_TEXT_MIME: &str = "text/plain";

/// Content type used for binary or streamed media without an explicit mime type.
pub const DEFAULT_BINARY_MIME: &str = "application/octet-stream";

/// A boxed byte stream used for streamed uploads.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// The bytes of an upload.
pub enum MediaBody {
    /// Literal text.
    Text(String),
    /// Literal bytes.
    Bytes(Bytes),
    /// A stream piped to the server as it is read.
    Stream(BodyStream),
}

impl MediaBody {
    /// Wraps a byte stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Returns the content type to use when none was given.
    pub fn default_mime_type(&self) -> &'static str {
        match self {
            Self::Text(_) => DEFAULT_TEXT_MIME,
            Self::Bytes(_) | Self::Stream(_) => DEFAULT_BINARY_MIME,
        }
    }

    /// Returns `true` if this body must be piped rather than sent whole.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns the literal bytes, or `None` for a stream.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            Self::Stream(_) => None,
        }
    }

    /// Converts the body into a stream, wrapping literals in a single chunk.
    pub fn into_stream(self) -> BodyStream {
        match self {
            Self::Text(s) => stream::once(async move { Ok(Bytes::from(s)) }).boxed(),
            Self::Bytes(b) => stream::once(async move { Ok(b) }).boxed(),
            Self::Stream(s) => s,
        }
    }
}

impl fmt::Debug for MediaBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for MediaBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MediaBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for MediaBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for MediaBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// An upload payload with an optional explicit content type.
///
/// ## Examples
///
/// ```
/// use discovery::Media;
///
/// let media = Media::new("hello");
/// assert_eq!(media.content_type(None), "text/plain");
///
/// let media = Media::new(vec![0u8, 1, 2]).with_mime_type("image/png");
/// assert_eq!(media.content_type(None), "image/png");
/// ```
#[derive(Debug)]
pub struct Media {
    /// The payload.
    pub body: MediaBody,
    /// Explicit content type, if the caller knows it.
    pub mime_type: Option<String>,
}

impl Media {
    /// Creates a payload without an explicit content type.
    pub fn new(body: impl Into<MediaBody>) -> Self {
        Self {
            body: body.into(),
            mime_type: None,
        }
    }

    /// Sets the content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Resolves the content type of the media part.
    ///
    /// Precedence: the explicit mime type, then the fallback (a `mimeType`
    /// taken from the request resource), then the body's default.
    pub fn content_type(&self, fallback: Option<&str>) -> String {
        self.mime_type
            .as_deref()
            .or(fallback)
            .unwrap_or_else(|| self.body.default_mime_type())
            .to_string()
    }
}
