//! Pass-through to the backend's payment gateway endpoint.
//!
//! The gateway takes a fixed parameter shape and answers with a
//! success/failure [`PaymentOutcome`]; no provider-specific shaping happens here.

mod model;
mod wire;

pub use model::{PaymentOutcome, PaymentReceipt, PaymentRequest};

use crate::core::{ApiClient, ApiError, ApiRequest, CachePolicy, RetryConfig};
use wire::{ChargePayload, ChargeResponse};

const DEFAULT_CHARGE_PATH: &str = "/pagamentos";
const DECLINED_STATUSES: &[&str] = &["failed", "declined", "canceled", "cancelled"];

/// Submits charges through an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    client: ApiClient,
    path: String,
    token: Option<String>,
}

impl PaymentGateway {
    /// A gateway posting to `/pagamentos`.
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.clone(),
            path: DEFAULT_CHARGE_PATH.to_string(),
            token: None,
        }
    }

    /// Post charges to `path` instead.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Authenticate charges with a bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Submit a charge. Never fails: every error is folded into [`PaymentOutcome::Failed`].
    ///
    /// Without an idempotency key the primary host gets a single attempt.
    pub async fn charge(&self, req: &PaymentRequest) -> PaymentOutcome {
        match self.try_charge(req).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(kind = %e.kind, status = ?e.status, "charge failed");
                PaymentOutcome::Failed {
                    message: e.message,
                    code: e.code,
                }
            }
        }
    }

    async fn try_charge(&self, req: &PaymentRequest) -> Result<PaymentOutcome, ApiError> {
        let mut api_req = ApiRequest::post(self.path.as_str())
            .json(&ChargePayload::from(req))?
            .bearer_opt(self.token.as_deref())
            .cache(CachePolicy::disabled());
        api_req = match &req.idempotency_key {
            Some(key) => api_req.header("Idempotency-Key", key.as_str()),
            None => api_req.retry_policy(Some(RetryConfig::disabled())),
        };

        let resp: ChargeResponse = self.client.request(api_req).await?;
        Ok(outcome_from(resp))
    }
}

fn outcome_from(resp: ChargeResponse) -> PaymentOutcome {
    let declined = resp.success == Some(false)
        || resp
            .status
            .as_deref()
            .is_some_and(|s| DECLINED_STATUSES.contains(&s.to_ascii_lowercase().as_str()));

    match (declined, resp.id) {
        (false, Some(id)) => PaymentOutcome::Succeeded(PaymentReceipt {
            id,
            status: resp.status.unwrap_or_else(|| "succeeded".to_string()),
            amount: resp.amount,
            currency: resp.currency,
        }),
        _ => PaymentOutcome::Failed {
            message: resp
                .message
                .unwrap_or_else(|| "The payment was not approved.".to_string()),
            code: resp.code,
        },
    }
}
