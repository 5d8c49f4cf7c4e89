//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use discovery::transport::BoxFuture;
use discovery::{RawResponse, Transport, TransportError, TransportRequest};
use serde_json::Value;

/// Loads a fixture from `tests/fixtures/`.
pub fn load_fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

/// The drive fixture with its root URL pointed at `root_url`.
pub fn drive_document(root_url: &str) -> Value {
    let mut document = load_fixture("drive.json");
    document["rootUrl"] = Value::String(format!("{root_url}/"));
    document
}

/// A transport that records requests and answers with a canned response.
#[derive(Default)]
pub struct SpyTransport {
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<Vec<(String, String)>>>,
    pub status: u16,
    pub body: &'static str,
}

impl SpyTransport {
    pub fn ok(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status: 200,
            body,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for SpyTransport {
    fn request(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url.clone());
        self.queries.lock().unwrap().push(request.query.clone());
        let response = RawResponse::new(self.status, self.body);
        Box::pin(async move { Ok(response) })
    }
}
