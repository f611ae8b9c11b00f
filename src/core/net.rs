//! The transport seam: one HTTP exchange, fully buffered.
//!
//! Everything above this module (retries, failover, caching, error
//! normalization) talks to a [`Transport`], so tests can swap the network for a
//! stub and count exactly how many exchanges were attempted.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;
use url::Url;

/// A fully described outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Headers to send, already merged with client defaults.
    pub headers: HeaderMap,
    /// Serialized request body, if any.
    pub body: Option<Vec<u8>>,
    /// Per-request timeout. `None` leaves the client's own defaults in place.
    pub timeout: Option<Duration>,
    /// Whether 3xx responses should be followed.
    pub follow_redirects: bool,
}

impl HttpRequest {
    /// A bodiless request with no extra headers.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            follow_redirects: true,
        }
    }
}

/// A completed HTTP exchange with its body read into memory.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response from parts; mostly useful for stub transports.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `content-type` header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// `true` when the declared content type is JSON (including `+json` suffixes).
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// A failure before any HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS failure, refused or reset connection.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request or connect phase exceeded its deadline.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The response arrived but its body could not be read or decoded.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// Any other failure raised by the HTTP stack.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Connection-class failures, the ones worth retrying against another host.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// Deadline-class failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let msg = e.to_string();
        if e.is_timeout() {
            Self::Timeout(msg)
        } else if e.is_connect() {
            Self::Connect(msg)
        } else if e.is_body() || e.is_decode() {
            Self::Body(msg)
        } else if e.is_request() {
            // reqwest reports some socket-level failures (e.g. reset during send)
            // as request errors rather than connect errors.
            Self::Connect(msg)
        } else {
            Self::Other(msg)
        }
    }
}

/// Executes a single HTTP exchange. No retries, no caching.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `req` and buffer the full response.
    fn send<'a>(&'a self, req: &'a HttpRequest) -> BoxFuture<'a, Result<RawResponse, TransportError>>;
}

/// The production transport, backed by `reqwest`.
///
/// Holds two clients because redirect handling is a client-level setting in
/// `reqwest`: probes must not follow redirects while API calls do.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    no_redirect: Client,
}

impl ReqwestTransport {
    /// Wrap pre-built clients.
    pub fn new(http: Client, no_redirect: Client) -> Self {
        Self { http, no_redirect }
    }

    pub(crate) fn from_settings(
        user_agent: &str,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let configure = |mut b: reqwest::ClientBuilder| {
            b = b.user_agent(user_agent);
            if let Some(t) = timeout {
                b = b.timeout(t);
            }
            if let Some(ct) = connect_timeout {
                b = b.connect_timeout(ct);
            }
            b
        };

        let http = configure(Client::builder()).build()?;
        let no_redirect = configure(Client::builder())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, no_redirect })
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(&'a self, req: &'a HttpRequest) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let client = if req.follow_redirects {
                &self.http
            } else {
                &self.no_redirect
            };

            let mut rb = client
                .request(req.method.clone(), req.url.clone())
                .headers(req.headers.clone());
            if let Some(body) = &req.body {
                rb = rb.body(body.clone());
            }
            if let Some(t) = req.timeout {
                rb = rb.timeout(t);
            }

            let resp = rb.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?.to_vec();

            Ok(RawResponse {
                status,
                headers,
                body,
            })
        })
    }
}
