//! In-memory TTL cache for successful responses.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;

/// Defines the behavior of the in-memory cache for an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, fetch from the network
    /// and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

/// Per-request cache settings.
///
/// When a request carries no policy, GET requests are cached with the client's
/// default TTL and every other method is not cached at all.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CachePolicy {
    /// Read/write behavior.
    pub mode: CacheMode,
    /// Entry lifetime; the client default applies when `None`.
    pub ttl: Option<Duration>,
    /// Explicit cache key, overriding the derived one.
    pub key: Option<String>,
}

impl CachePolicy {
    /// Caching enabled with an explicit TTL.
    pub fn enabled(ttl: Duration) -> Self {
        Self {
            mode: CacheMode::Use,
            ttl: Some(ttl),
            key: None,
        }
    }

    /// Caching explicitly disabled.
    pub fn disabled() -> Self {
        Self {
            mode: CacheMode::Bypass,
            ..Self::default()
        }
    }

    /// Override the derived cache key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Change the read/write behavior.
    #[must_use]
    pub fn mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Whether a request participates in caching, and how.
///
/// GET requests are cached unless the policy bypasses the cache; other methods
/// only when a policy is present and does not bypass it.
pub(crate) fn effective_mode(method: &Method, policy: Option<&CachePolicy>) -> CacheMode {
    match policy {
        Some(p) => p.mode,
        None if *method == Method::GET => CacheMode::Use,
        None => CacheMode::Bypass,
    }
}

/// Derive the cache key for a request.
///
/// An explicit key always wins. GET requests are keyed by path and query alone;
/// other methods also include the method and the serialized body. `serde_json`
/// orders object keys, so equal bodies always serialize identically.
pub fn cache_key(method: &Method, path: &str, body: Option<&Value>, explicit: Option<&str>) -> String {
    if let Some(k) = explicit {
        return k.to_string();
    }
    if *method == Method::GET {
        return path.to_string();
    }
    let body = body.map(Value::to_string).unwrap_or_default();
    format!("{method} {path} {body}")
}

/// A cached payload and its expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The parsed response payload.
    pub payload: Value,
    /// When the entry was written.
    pub stored_at: Instant,
    /// How long the entry stays live.
    pub ttl: Duration,
}

impl CacheEntry {
    /// `true` once `ttl` has fully elapsed since `stored_at`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) >= self.ttl
    }
}

/// A keyed store of [`CacheEntry`] values. Entries are only ever replaced, never mutated.
#[derive(Debug, Default)]
pub struct ResponseCache {
    map: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live payload stored under `key`. Expired entries are evicted and reported absent.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let guard = self.map.read().await;
            match guard.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        let mut guard = self.map.write().await;
        // Re-check under the write lock: a concurrent writer may have refreshed it.
        if guard.get(key).is_some_and(|e| e.is_expired(now)) {
            guard.remove(key);
        }
        None
    }

    /// Store `payload` under `key`, replacing any existing entry.
    ///
    /// Expired entries under other keys are swept out at the same time.
    pub async fn set(&self, key: impl Into<String>, payload: Value, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            payload,
            stored_at: now,
            ttl,
        };
        let mut guard = self.map.write().await;
        guard.retain(|_, e| !e.is_expired(now));
        guard.insert(key.into(), entry);
    }

    /// Remove every entry whose key starts with `prefix`, or all entries when `prefix` is `None`.
    pub async fn clear(&self, prefix: Option<&str>) {
        let mut guard = self.map.write().await;
        match prefix {
            Some(p) => guard.retain(|k, _| !k.starts_with(p)),
            None => guard.clear(),
        }
    }

    /// Number of stored entries, live or not yet evicted.
    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    /// `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }
}
