//! Wire payloads for the payment gateway REST API.

use serde::{Deserialize, Serialize};

/// Body for `POST /v1/orders`.
#[derive(Debug, Serialize)]
pub(super) struct CreateOrderDto<'a> {
    /// Amount in minor units.
    pub amount: i64,
    /// ISO 4217 currency.
    pub currency: &'a str,
    /// Merchant reference echoed back in dashboards and exports.
    pub receipt: &'a str,
}

/// Response for `POST /v1/orders`.
#[derive(Debug, Deserialize)]
pub(super) struct OrderDto {
    /// Gateway order identifier.
    pub id: String,
}

/// Response for `GET /v1/payments/{id}`.
#[derive(Debug, Deserialize)]
pub(super) struct PaymentDto {
    /// Gateway payment identifier.
    pub id: String,
    /// Gateway order the payment belongs to.
    #[serde(default)]
    pub order_id: String,
    /// Paid amount in minor units.
    #[serde(default)]
    pub amount: i64,
    /// Currency of the payment.
    #[serde(default)]
    pub currency: String,
    /// Payment state in the gateway's wire form.
    pub status: String,
}

/// Error envelope the gateway returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct GatewayErrorDto {
    /// Error body.
    #[serde(default)]
    pub error: GatewayErrorBody,
}

/// Inner error description.
#[derive(Debug, Default, Deserialize)]
pub(super) struct GatewayErrorBody {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}
