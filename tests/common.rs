#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use httpmock::MockServer;
use marketplace_api::core::net::{HttpRequest, RawResponse, Transport, TransportError};
use marketplace_api::{ApiClient, ApiClientBuilder, ProbeMode, RetryConfig};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

type Handler = dyn Fn(&HttpRequest, usize) -> Result<RawResponse, TransportError> + Send + Sync;

/// Scripted in-process transport that records every request it receives.
/// The handler gets the request and the zero-based call index.
pub struct StubTransport {
    handler: Box<Handler>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubTransport")
            .field("calls", &self.calls())
            .finish()
    }
}

impl StubTransport {
    pub fn new<F>(f: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest, usize) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(f),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn always_unreachable() -> Arc<Self> {
        Self::new(|_, _| Err(unreachable_err()))
    }

    pub fn always(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(move |_, _| Ok(json_response(status, body)))
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// `host:port` of each request, in call order.
    pub fn hosts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{}:{}", r.url.host_str().unwrap_or(""), r.url.port_or_known_default().unwrap_or(0)))
            .collect()
    }
}

impl Transport for StubTransport {
    fn send<'a>(&'a self, req: &'a HttpRequest) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let n = {
                let mut seen = self.seen.lock().unwrap();
                seen.push(req.clone());
                seen.len() - 1
            };
            (self.handler)(req, n)
        })
    }
}

pub fn unreachable_err() -> TransportError {
    TransportError::Connect("Network request failed".into())
}

pub fn json_response(status: u16, body: &str) -> RawResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    RawResponse::new(StatusCode::from_u16(status).unwrap(), headers, body.as_bytes().to_vec())
}

pub fn text_response(status: u16, body: &str) -> RawResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    RawResponse::new(StatusCode::from_u16(status).unwrap(), headers, body.as_bytes().to_vec())
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Refuses connections immediately.
pub const DEAD_HOST: &str = "http://127.0.0.1:1";

/// Retry policy with millisecond delays so tests stay fast.
pub fn fast_retry(retries: u32) -> RetryConfig {
    RetryConfig::fixed(retries, Duration::from_millis(1))
}

/// Builder preconfigured for tests: no live probes, fast retries.
pub fn test_builder() -> ApiClientBuilder {
    ApiClient::builder()
        .probe_mode(ProbeMode::AssumeOnline)
        .retry_config(fast_retry(3))
        .fallback_retry_config(fast_retry(1))
}

/// Client talking to a mock server through the real `reqwest` transport.
pub fn client_for(server: &MockServer) -> ApiClient {
    test_builder()
        .base_url(url(&server.base_url()))
        .build()
        .unwrap()
}

/// Client whose single base URL is served by `stub`.
pub fn stub_client(stub: &Arc<StubTransport>) -> ApiClient {
    test_builder()
        .base_url(url("http://primary.test"))
        .transport(stub.clone())
        .build()
        .unwrap()
}
