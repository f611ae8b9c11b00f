use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::core::net::{RawResponse, TransportError};

/// Classification of every failure surfaced by [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// HTTP 400.
    Validation,
    /// HTTP 401. Also emits [`SessionEvent::AuthExpired`](crate::SessionEvent::AuthExpired).
    AuthTokenExpired,
    /// HTTP 403.
    AuthForbidden,
    /// HTTP 404, after any 404 retries were exhausted.
    NotFound,
    /// HTTP 409.
    Conflict,
    /// HTTP 500, 502, 503 or 504.
    Server,
    /// No HTTP response could be obtained (DNS, refused connection, reset).
    Network,
    /// A request deadline elapsed.
    Timeout,
    /// The response body did not match its declared content type or the expected shape.
    Parse,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable identifier, safe to branch on.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::AuthForbidden => "AUTH_FORBIDDEN",
            Self::NotFound => "DATA_NOT_FOUND",
            Self::Conflict => "DATA_CONFLICT",
            Self::Server => "SERVER_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Map an HTTP status to its kind.
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            401 => Self::AuthTokenExpired,
            403 => Self::AuthForbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500 | 502 | 503 | 504 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized error returned by every request.
///
/// `message` is safe to show to an end user; `code` is safe to branch on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Machine-readable code: the backend's own code when it sent one, else the kind identifier.
    pub code: Option<String>,
}

pub(crate) const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Check your internet connection and try again.";
pub(crate) const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try again.";
pub(crate) const PARSE_MESSAGE: &str = "The server returned a response that could not be read.";

impl ApiError {
    /// Build an error of `kind` whose code is the kind identifier.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: Some(kind.as_str().to_string()),
        }
    }

    /// Attach an HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// A response body that could not be decoded.
    pub fn parse(detail: impl std::fmt::Display) -> Self {
        tracing::debug!(%detail, "response parse failure");
        Self::new(ErrorKind::Parse, PARSE_MESSAGE)
    }

    /// Shorthand for `self.kind == ErrorKind::AuthTokenExpired`.
    pub fn is_auth_expired(&self) -> bool {
        self.kind == ErrorKind::AuthTokenExpired
    }
}

/// Normalize a non-2xx HTTP response.
///
/// A JSON body with a string `message` supplies the message; otherwise it is
/// synthesized from the status line. A string `code` or `errorCode` field in
/// the body overrides the kind identifier as the error code.
pub fn classify_status(resp: &RawResponse) -> ApiError {
    let status = resp.status.as_u16();
    let kind = ErrorKind::from_status(status);
    let body: Option<Value> = serde_json::from_slice(&resp.body).ok();

    let field = |name: &str| {
        body.as_ref()
            .and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let message = field("message").unwrap_or_else(|| status_line_message(resp.status));
    let code = field("code")
        .or_else(|| field("errorCode"))
        .unwrap_or_else(|| kind.as_str().to_string());

    ApiError {
        kind,
        message,
        status: Some(status),
        code: Some(code),
    }
}

/// Normalize a failure that produced no HTTP response.
///
/// Connect and timeout failures get user-facing messages; undecodable bodies
/// become `PARSE_ERROR`; anything else passes through with its own message.
pub fn classify_transport(err: &TransportError) -> ApiError {
    match err {
        TransportError::Connect(_) => ApiError::new(ErrorKind::Network, NETWORK_MESSAGE),
        TransportError::Timeout(_) => ApiError::new(ErrorKind::Timeout, TIMEOUT_MESSAGE),
        TransportError::Body(_) => ApiError::new(ErrorKind::Parse, PARSE_MESSAGE),
        TransportError::Other(msg) => ApiError {
            kind: ErrorKind::Unknown,
            message: msg.clone(),
            status: None,
            code: None,
        },
    }
}

fn status_line_message(status: StatusCode) -> String {
    format!(
        "API error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Errors raised while building an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum BuildError {
    /// A base or probe URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// No base URL was configured.
    #[error("at least one base URL is required")]
    NoBaseUrls,
}
