use std::time::Duration;

use super::constants::{
    DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, FALLBACK_RETRIES, FALLBACK_RETRY_DELAY,
};
use crate::core::net::{HttpRequest, RawResponse, Transport, TransportError};

/// Specifies the backoff strategy for retrying failed requests.
///
/// Clients use [`Backoff::Fixed`] unless a caller opts into
/// [`Backoff::Exponential`] through a custom [`RetryConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries. (Default)
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the zero-based `attempt` failed.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential { base, factor, max } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let nanos = base.as_nanos() as f64 * factor.powi(exp);
                let cap = max.as_nanos() as f64;
                if nanos.is_finite() && nanos < cap {
                    Duration::from_nanos(nanos.max(0.0) as u64)
                } else {
                    *max
                }
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// Retries target transport failures and the statuses listed in
/// `retry_on_status`. Any other HTTP status is returned immediately.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// HTTP statuses that trigger a retry. On the final attempt the response is returned as-is.
    ///
    /// Defaults to `[404]`: a multi-instance backend may briefly report a route
    /// as missing while a deployment propagates.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection and other transport errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl RetryConfig {
    /// `retries` retries with a constant `delay`, using the default retry triggers.
    pub fn fixed(retries: u32, delay: Duration) -> Self {
        Self {
            enabled: true,
            max_retries: retries,
            backoff: Backoff::Fixed(delay),
            retry_on_status: vec![404],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }

    /// The reduced budget applied to each fallback base URL.
    pub fn fallback() -> Self {
        Self::fixed(FALLBACK_RETRIES, FALLBACK_RETRY_DELAY)
    }

    /// A single attempt, never retried.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Total attempts this policy allows.
    pub fn attempts(&self) -> u32 {
        if self.enabled {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }

    /// The budget for a fallback host, never larger than `primary`'s.
    pub(crate) fn capped_by(&self, primary: &Self) -> Self {
        let mut cfg = self.clone();
        cfg.enabled = self.enabled && primary.enabled;
        cfg.max_retries = self.max_retries.min(primary.max_retries);
        cfg
    }

    fn retries_error(&self, err: &TransportError) -> bool {
        match err {
            TransportError::Timeout(_) => self.retry_on_timeout,
            // the server already answered; resending could repeat a side effect
            TransportError::Body(_) => false,
            TransportError::Connect(_) | TransportError::Other(_) => self.retry_on_connect,
        }
    }
}

/// Issue `req`, retrying transport failures and `retry_on_status` responses.
///
/// On the last attempt a retryable status is returned rather than turned into
/// an error, and a transport error is returned to the caller for
/// classification. A body that fails to read is never retried, since the
/// server already received the request. Attempts are strictly sequential.
///
/// # Errors
///
/// Returns the last [`TransportError`] when every attempt failed without a response.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    req: &HttpRequest,
    cfg: &RetryConfig,
) -> Result<RawResponse, TransportError> {
    let attempts = cfg.attempts();
    let mut attempt = 0;

    loop {
        let last = attempt + 1 >= attempts;
        tracing::debug!(
            method = %req.method,
            url = %req.url,
            attempt = attempt + 1,
            attempts,
            "sending request"
        );

        match transport.send(req).await {
            Ok(resp) => {
                let status = resp.status.as_u16();
                if last || !cfg.retry_on_status.contains(&status) {
                    return Ok(resp);
                }
                tracing::debug!(status, url = %req.url, "retryable status, will retry");
            }
            Err(e) => {
                if last || !cfg.retries_error(&e) {
                    tracing::warn!(error = %e, url = %req.url, attempts = attempt + 1, "request failed");
                    return Err(e);
                }
                tracing::debug!(error = %e, url = %req.url, "transport error, will retry");
            }
        }

        tokio::time::sleep(cfg.backoff.delay_for(attempt)).await;
        attempt += 1;
    }
}
