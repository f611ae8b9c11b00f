use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::core::client::{CachePolicy, RetryConfig};
use crate::core::error::{ApiError, ErrorKind};

/// One logical API call: an endpoint path plus everything needed to send it.
///
/// Built with chained setters and consumed by [`ApiClient::request`](crate::ApiClient::request).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub(crate) path: String,
    pub(crate) method: Method,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) bearer: Option<String>,
    pub(crate) retries: Option<u32>,
    pub(crate) delay: Option<Duration>,
    pub(crate) retry_override: Option<RetryConfig>,
    pub(crate) cache: Option<CachePolicy>,
}

impl ApiRequest {
    /// A request for `path` (relative to each base URL, query string included).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            path,
            method,
            headers: Vec::new(),
            body: None,
            bearer: None,
            retries: None,
            delay: None,
            retry_override: None,
            cache: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Shorthand for a PATCH request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header. Caller headers override the client's defaults.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION_ERROR` when `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::new(ErrorKind::Validation, format!("request body is not valid JSON: {e}"))
        })?;
        Ok(self.body(value))
    }

    /// Attach a bearer credential as the `Authorization` header.
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Same as [`bearer`](Self::bearer), skipping `None`.
    #[must_use]
    pub fn bearer_opt(mut self, token: Option<impl Into<String>>) -> Self {
        if let Some(t) = token {
            self.bearer = Some(t.into());
        }
        self
    }

    /// Retries against the primary base URL. Total attempts = `n + 1`.
    #[must_use]
    pub const fn retries(mut self, n: u32) -> Self {
        self.retries = Some(n);
        self
    }

    /// Fixed delay between retries against the primary base URL.
    #[must_use]
    pub const fn delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Replace the client's primary retry policy for this call. Fallback hosts
    /// never get more attempts than the resolved primary policy allows.
    /// `retries`/`delay` still apply on top of it.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Set the cache policy for this call.
    #[must_use]
    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    /// Endpoint path, query included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP verb.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The primary-host retry policy this request resolves to.
    pub(crate) fn primary_retry(&self, client_default: &RetryConfig) -> RetryConfig {
        let mut cfg = self
            .retry_override
            .clone()
            .unwrap_or_else(|| client_default.clone());
        if let Some(n) = self.retries {
            cfg.max_retries = n;
        }
        if let Some(d) = self.delay {
            cfg.backoff = crate::core::client::Backoff::Fixed(d);
        }
        cfg
    }
}
