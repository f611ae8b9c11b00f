//! Public client surface + builder.
//! Internals are split into `dispatch` (the request pipeline), `retry`, `cache`,
//! `connectivity`, and `constants` (defaults + environment keys).

mod base_urls;
mod cache;
mod connectivity;
mod constants;
mod dispatch;
mod retry;

pub use base_urls::BaseUrls;
pub use cache::{CacheEntry, CacheMode, CachePolicy, ResponseCache, cache_key};
pub use connectivity::{Connectivity, ConnectivityStatus, ProbeMode};
pub use retry::{Backoff, RetryConfig, fetch_with_retry};

use std::env;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::core::error::BuildError;
use crate::core::net::{HttpRequest, RawResponse, ReqwestTransport, Transport, TransportError};
use crate::core::session::{SessionEvent, SessionListener};
use constants::{
    DEFAULT_CACHE_TTL, DEFAULT_CONNECTIVITY_TTL, DEFAULT_PROBE_TIMEOUT, ENV_BASE_URLS, ENV_MODE,
    PUBLIC_PROBE_URLS, USER_AGENT,
};

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the response cache and connectivity state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_urls: BaseUrls,
    retry: RetryConfig,
    fallback_retry: RetryConfig,
    cache: Arc<ResponseCache>,
    cache_ttl: Duration,
    connectivity: Arc<Connectivity>,
    preflight: bool,
    session: Option<SessionListener>,
}

impl ApiClient {
    /// Create a new builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The configured base URLs, primary first.
    pub fn base_urls(&self) -> &BaseUrls {
        &self.base_urls
    }

    /// The retry policy applied to the primary host.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// The retry policy applied to each fallback host.
    pub fn fallback_retry_config(&self) -> &RetryConfig {
        &self.fallback_retry
    }

    /// The TTL used when a request's cache policy does not name one.
    pub fn default_cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// The shared response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop cached responses whose key starts with `prefix`, or all of them.
    pub async fn clear_cache(&self, prefix: Option<&str>) {
        self.cache.clear(prefix).await;
    }

    /// Whether the network currently appears reachable. Never fails; results are cached.
    pub async fn check_connectivity(&self) -> bool {
        self.connectivity.check(self.transport.as_ref()).await
    }

    /// The connectivity prober, for inspecting or invalidating its cached status.
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Send one request through the retry loop without failover, caching, or normalization.
    ///
    /// # Errors
    ///
    /// Returns the last [`TransportError`] if no attempt produced a response.
    pub async fn fetch_with_retry(
        &self,
        req: &HttpRequest,
        cfg: &RetryConfig,
    ) -> Result<RawResponse, TransportError> {
        fetch_with_retry(self.transport.as_ref(), req, cfg).await
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn emit(&self, event: &SessionEvent) {
        if let Some(listener) = &self.session {
            listener.emit(event);
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct ApiClientBuilder {
    base_urls: Vec<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    retry: Option<RetryConfig>,
    fallback_retry: Option<RetryConfig>,
    retry_enabled: Option<bool>,

    cache_ttl: Option<Duration>,

    probe_urls: Option<Vec<Url>>,
    probe_timeout: Option<Duration>,
    connectivity_ttl: Option<Duration>,
    probe_mode: Option<ProbeMode>,
    preflight: bool,

    session: Option<SessionListener>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    /// Seed a builder from the environment.
    ///
    /// `MARKETPLACE_API_BASE_URLS` holds a comma-separated, ordered list of base
    /// URLs. `MARKETPLACE_ENV=test` switches connectivity probing to
    /// [`ProbeMode::AssumeOnline`].
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the base URL list is present but invalid.
    pub fn from_env() -> Result<Self, BuildError> {
        let mut builder = Self::default();
        if let Ok(list) = env::var(ENV_BASE_URLS) {
            builder = builder.base_urls(BaseUrls::parse_list(&list)?.iter().cloned());
        }
        if env::var(ENV_MODE).is_ok_and(|m| m.eq_ignore_ascii_case("test")) {
            builder = builder.probe_mode(ProbeMode::AssumeOnline);
        }
        Ok(builder)
    }

    /// Append a base URL. The first one added is the primary host.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_urls.push(url);
        self
    }

    /// Replace the base URL list, primary first.
    pub fn base_urls(mut self, urls: impl IntoIterator<Item = Url>) -> Self {
        self.base_urls = urls.into_iter().collect();
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Retry policy for the primary host. Default: 3 retries, 1 s fixed delay.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Retry policy for each fallback host. Default: 1 retry, 500 ms fixed delay.
    pub fn fallback_retry_config(mut self, cfg: RetryConfig) -> Self {
        self.fallback_retry = Some(cfg);
        self
    }

    /// Turn retries on or off for every host.
    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = Some(enabled);
        self
    }

    /// Default TTL for cached responses. Default: 120 s.
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Public endpoints probed after the primary base URL.
    pub fn probe_urls(mut self, urls: impl IntoIterator<Item = Url>) -> Self {
        self.probe_urls = Some(urls.into_iter().collect());
        self
    }

    /// Timeout for each connectivity probe. Default: 5 s.
    pub fn probe_timeout(mut self, dur: Duration) -> Self {
        self.probe_timeout = Some(dur);
        self
    }

    /// How long a positive connectivity result is reused. Negative results last half as long.
    pub fn connectivity_ttl(mut self, dur: Duration) -> Self {
        self.connectivity_ttl = Some(dur);
        self
    }

    /// Live probing or the test-mode short-circuit.
    pub fn probe_mode(mut self, mode: ProbeMode) -> Self {
        self.probe_mode = Some(mode);
        self
    }

    /// Check connectivity before each request and fail fast when offline. Default: off.
    pub fn preflight_connectivity(mut self, enabled: bool) -> Self {
        self.preflight = enabled;
        self
    }

    /// Register the session-lifecycle listener.
    pub fn on_session_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.session = Some(SessionListener::new(f));
        self
    }

    /// Use a custom transport instead of the built-in `reqwest` one.
    /// `user_agent`, `timeout`, and `connect_timeout` are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if no base URL was configured, a default probe
    /// URL fails to parse, or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient, BuildError> {
        let base_urls = BaseUrls::new(self.base_urls)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::from_settings(
                self.user_agent.as_deref().unwrap_or(USER_AGENT),
                self.timeout,
                self.connect_timeout,
            )?),
        };

        let mut retry = self.retry.unwrap_or_default();
        let mut fallback_retry = self.fallback_retry.unwrap_or_else(RetryConfig::fallback);
        if let Some(enabled) = self.retry_enabled {
            retry.enabled = enabled;
            fallback_retry.enabled = enabled;
        }

        let public = match self.probe_urls {
            Some(urls) => urls,
            None => PUBLIC_PROBE_URLS
                .iter()
                .copied()
                .map(Url::parse)
                .collect::<Result<Vec<_>, _>>()?,
        };
        let mut targets = vec![base_urls.primary().clone()];
        targets.extend(public);

        let connectivity = Connectivity::new(
            targets,
            self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
            self.connectivity_ttl.unwrap_or(DEFAULT_CONNECTIVITY_TTL),
            self.probe_mode.unwrap_or_default(),
        );

        Ok(ApiClient {
            transport,
            base_urls,
            retry,
            fallback_retry,
            cache: Arc::new(ResponseCache::new()),
            cache_ttl: self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            connectivity: Arc::new(connectivity),
            preflight: self.preflight,
            session: self.session,
        })
    }
}
