//! The request pipeline: cache, primary host, failover, normalization.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::base_urls::join;
use super::cache::{CacheMode, cache_key, effective_mode};
use super::retry::fetch_with_retry;
use crate::core::error::{
    ApiError, ErrorKind, NETWORK_MESSAGE, classify_status, classify_transport,
};
use crate::core::net::{HttpRequest, RawResponse, TransportError};
use crate::core::request::ApiRequest;
use crate::core::session::SessionEvent;

const JSON: &str = "application/json";

impl super::ApiClient {
    /// Send `req` and deserialize the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when every host failed, the backend answered
    /// with a non-2xx status, or the payload does not deserialize into `T`.
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let value = self.request_value(req).await?;
        serde_json::from_value(value).map_err(ApiError::parse)
    }

    /// Send `req` and return the payload as JSON.
    ///
    /// JSON responses are parsed; any other content type becomes a JSON string
    /// and an empty body becomes `null`.
    ///
    /// The primary host is tried with the request's retry policy. A non-2xx
    /// answer from it is returned as an error right away; only a failure that
    /// produced no response at all moves on to the fallback hosts, in order,
    /// each with the reduced fallback policy (never more attempts than the
    /// primary got). A body that fails to read after a response arrived ends
    /// the call without failover.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    #[tracing::instrument(skip(self, req), fields(method = %req.method, path = %req.path), err)]
    pub async fn request_value(&self, req: ApiRequest) -> Result<Value, ApiError> {
        let mode = effective_mode(&req.method, req.cache.as_ref());
        let key = cache_key(
            &req.method,
            &req.path,
            req.body.as_ref(),
            req.cache.as_ref().and_then(|p| p.key.as_deref()),
        );

        if mode == CacheMode::Use
            && let Some(hit) = self.cache.get(&key).await
        {
            tracing::trace!(%key, "cache hit");
            return Ok(hit);
        }

        if self.preflight && !self.check_connectivity().await {
            return Err(ApiError::new(ErrorKind::Network, NETWORK_MESSAGE));
        }

        let headers = build_headers(&req)?;
        let body = req
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::new(ErrorKind::Validation, e.to_string()))?;

        let primary_cfg = req.primary_retry(&self.retry);
        let primary = self.http_request(&req, self.base_urls.primary(), &headers, body.clone())?;

        let transport_err = match fetch_with_retry(self.transport(), &primary, &primary_cfg).await {
            Ok(resp) => return self.finish(&req, resp, mode, key).await,
            Err(e) => e,
        };

        let mut last = classify_transport(&transport_err);
        // A response arrived, so the primary did process the request.
        if matches!(transport_err, TransportError::Body(_)) {
            return Err(self.fail(&req, last));
        }

        let fallback_cfg = self.fallback_retry.capped_by(&primary_cfg);
        for base in self.base_urls.fallbacks() {
            tracing::warn!(host = %base, error = %transport_err, "primary host unreachable, failing over");
            let fallback = self.http_request(&req, base, &headers, body.clone())?;
            match fetch_with_retry(self.transport(), &fallback, &fallback_cfg).await {
                Ok(resp) if resp.is_success() => return self.finish(&req, resp, mode, key).await,
                Ok(resp) => last = classify_status(&resp),
                Err(e @ TransportError::Body(_)) => return Err(self.fail(&req, classify_transport(&e))),
                Err(e) => last = classify_transport(&e),
            }
        }

        Err(self.fail(&req, last))
    }

    /// GET `path` with an optional bearer token.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.request(ApiRequest::get(path).bearer_opt(token)).await
    }

    /// POST `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::post(path).json(body)?.bearer_opt(token))
            .await
    }

    /// PUT `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::put(path).json(body)?.bearer_opt(token))
            .await
    }

    /// PATCH `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::patch(path).json(body)?.bearer_opt(token))
            .await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.request(ApiRequest::delete(path).bearer_opt(token)).await
    }

    fn http_request(
        &self,
        req: &ApiRequest,
        base: &url::Url,
        headers: &HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest, ApiError> {
        let url = join(base, &req.path).map_err(|e| {
            ApiError::new(ErrorKind::Validation, format!("invalid request URL {}: {e}", req.path))
        })?;
        let mut http = HttpRequest::new(req.method.clone(), url);
        http.headers = headers.clone();
        http.body = body;
        Ok(http)
    }

    async fn finish(
        &self,
        req: &ApiRequest,
        resp: RawResponse,
        mode: CacheMode,
        key: String,
    ) -> Result<Value, ApiError> {
        if !resp.is_success() {
            return Err(self.fail(req, classify_status(&resp)));
        }

        let value = parse_body(&resp)?;
        if mode != CacheMode::Bypass {
            let ttl = req
                .cache
                .as_ref()
                .and_then(|p| p.ttl)
                .unwrap_or(self.cache_ttl);
            self.cache.set(key, value.clone(), ttl).await;
        }
        Ok(value)
    }

    fn fail(&self, req: &ApiRequest, err: ApiError) -> ApiError {
        if err.is_auth_expired() {
            self.emit(&SessionEvent::AuthExpired {
                path: req.path.clone(),
            });
        }
        err
    }
}

fn build_headers(req: &ApiRequest) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    if req.body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    }
    if let Some(token) = &req.bearer {
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
    }

    for (name, value) in &req.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ApiError::new(ErrorKind::Validation, format!("invalid header name: {name}"))
        })?;
        headers.insert(name, header_value(value)?);
    }
    Ok(headers)
}

fn header_value(v: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(v)
        .map_err(|_| ApiError::new(ErrorKind::Validation, "invalid header value"))
}

fn parse_body(resp: &RawResponse) -> Result<Value, ApiError> {
    if resp.body.is_empty() {
        return Ok(Value::Null);
    }
    if resp.is_json() {
        return serde_json::from_slice(&resp.body).map_err(ApiError::parse);
    }
    String::from_utf8(resp.body.clone())
        .map(Value::String)
        .map_err(ApiError::parse)
}
