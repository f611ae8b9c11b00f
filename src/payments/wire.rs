use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::PaymentRequest;

#[derive(Serialize)]
pub(crate) struct ChargePayload<'a> {
    pub(crate) amount: Decimal,
    pub(crate) currency: &'a str,
    #[serde(rename = "paymentMethodId")]
    pub(crate) payment_method_id: &'a str,
    #[serde(rename = "customerId", skip_serializing_if = "Option::is_none")]
    pub(crate) customer_id: Option<&'a str>,
}

impl<'a> From<&'a PaymentRequest> for ChargePayload<'a> {
    fn from(r: &'a PaymentRequest) -> Self {
        Self {
            amount: r.amount,
            currency: &r.currency,
            payment_method_id: &r.payment_method_id,
            customer_id: r.customer_id.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ChargeResponse {
    pub(crate) success: Option<bool>,
    pub(crate) id: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) amount: Option<Decimal>,
    pub(crate) currency: Option<String>,
    pub(crate) message: Option<String>,
    #[serde(alias = "errorCode")]
    pub(crate) code: Option<String>,
}
