use rust_decimal::Decimal;
use serde::Serialize;

/// A charge to pass through to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount in major units (e.g. `49.90`).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Provider-side payment method identifier.
    pub payment_method_id: String,
    /// Provider-side customer identifier.
    pub customer_id: Option<String>,
    /// Deduplicates retried charges on the provider side.
    pub idempotency_key: Option<String>,
}

impl PaymentRequest {
    /// A charge of `amount` in `currency` against `payment_method_id`.
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        payment_method_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            payment_method_id: payment_method_id.into(),
            customer_id: None,
            idempotency_key: None,
        }
    }

    /// Attach a customer.
    #[must_use]
    pub fn customer(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    /// Attach an idempotency key. Without one the charge is never retried.
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// A confirmed charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    /// Provider-side charge identifier.
    pub id: String,
    /// Provider status string (e.g. "succeeded", "processing").
    pub status: String,
    /// Amount actually charged, when echoed back.
    pub amount: Option<Decimal>,
    /// Currency actually charged, when echoed back.
    pub currency: Option<String>,
}

/// Result of a charge attempt. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The provider accepted the charge.
    Succeeded(PaymentReceipt),
    /// The provider or the network rejected the charge.
    Failed {
        /// User-displayable reason.
        message: String,
        /// Machine-readable reason, if any.
        code: Option<String>,
    },
}

impl PaymentOutcome {
    /// `true` for [`PaymentOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}
