//! Cached reachability probing.

use std::time::{Duration, Instant};

use reqwest::Method;
use tokio::sync::RwLock;
use url::Url;

use crate::core::net::{HttpRequest, Transport};

/// How [`Connectivity::check`] decides reachability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// Probe the network. (Default)
    #[default]
    Live,
    /// Report the network as reachable without touching it. Intended for test environments.
    AssumeOnline,
}

/// The result of the latest probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectivityStatus {
    /// Whether any probe target answered.
    pub is_reachable: bool,
    /// When the probe finished.
    pub checked_at: Instant,
    /// How long the result may be reused.
    pub valid_for: Duration,
}

impl ConnectivityStatus {
    /// `true` while the result may still be reused.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.checked_at) < self.valid_for
    }
}

/// Probes a prioritized list of URLs and caches the verdict.
///
/// Concurrent callers with a stale status may each probe; the last writer wins.
#[derive(Debug)]
pub struct Connectivity {
    targets: Vec<Url>,
    timeout: Duration,
    positive_ttl: Duration,
    mode: ProbeMode,
    status: RwLock<Option<ConnectivityStatus>>,
}

impl Connectivity {
    /// A prober over `targets`, tried in order.
    pub fn new(targets: Vec<Url>, timeout: Duration, positive_ttl: Duration, mode: ProbeMode) -> Self {
        Self {
            targets,
            timeout,
            positive_ttl,
            mode,
            status: RwLock::new(None),
        }
    }

    /// The probe targets in priority order.
    pub fn targets(&self) -> &[Url] {
        &self.targets
    }

    /// The cached status, fresh or not.
    pub async fn last_status(&self) -> Option<ConnectivityStatus> {
        *self.status.read().await
    }

    /// Forget the cached status so the next check probes again.
    pub async fn invalidate(&self) {
        *self.status.write().await = None;
    }

    /// Whether outbound network access currently appears viable. Never fails.
    ///
    /// Any completed HTTP response counts as reachable, whatever its status.
    /// Negative results are cached for half as long as positive ones.
    pub async fn check(&self, transport: &dyn Transport) -> bool {
        if self.mode == ProbeMode::AssumeOnline {
            return true;
        }

        if let Some(status) = *self.status.read().await
            && status.is_fresh(Instant::now())
        {
            return status.is_reachable;
        }

        let is_reachable = self.probe(transport).await;
        let valid_for = if is_reachable {
            self.positive_ttl
        } else {
            self.positive_ttl / 2
        };

        *self.status.write().await = Some(ConnectivityStatus {
            is_reachable,
            checked_at: Instant::now(),
            valid_for,
        });
        is_reachable
    }

    async fn probe(&self, transport: &dyn Transport) -> bool {
        for url in &self.targets {
            let mut req = HttpRequest::new(Method::HEAD, url.clone());
            req.timeout = Some(self.timeout);
            req.follow_redirects = false;

            match transport.send(&req).await {
                Ok(resp) => {
                    tracing::debug!(%url, status = resp.status.as_u16(), "connectivity probe answered");
                    return true;
                }
                Err(e) => tracing::debug!(%url, error = %e, "connectivity probe failed"),
            }
        }
        tracing::warn!(targets = self.targets.len(), "all connectivity probes failed");
        false
    }
}
