//! Centralized defaults for retries, caching, connectivity, and identification.

use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("marketplace-api/", env!("CARGO_PKG_VERSION"));

/// Retries against the primary base URL (total attempts = retries + 1).
pub(crate) const DEFAULT_RETRIES: u32 = 3;
pub(crate) const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Reduced budget for each fallback base URL, bounding failover latency.
pub(crate) const FALLBACK_RETRIES: u32 = 1;
pub(crate) const FALLBACK_RETRY_DELAY: Duration = Duration::from_millis(500);

pub(crate) const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(120_000);

pub(crate) const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);
/// Lifetime of a positive connectivity result; negative results live half as long.
pub(crate) const DEFAULT_CONNECTIVITY_TTL: Duration = Duration::from_millis(10_000);

/// Public endpoints probed after the application backend.
pub(crate) const PUBLIC_PROBE_URLS: &[&str] = &[
    "https://clients3.google.com/generate_204",
    "https://www.cloudflare.com/cdn-cgi/trace",
    "https://www.apple.com/library/test/success.html",
];

/// Comma-separated, ordered list of backend base URLs.
pub(crate) const ENV_BASE_URLS: &str = "MARKETPLACE_API_BASE_URLS";
/// Execution mode; `test` disables live connectivity probes.
pub(crate) const ENV_MODE: &str = "MARKETPLACE_ENV";
