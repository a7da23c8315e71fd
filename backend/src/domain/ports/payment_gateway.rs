//! Driven port for the third-party payment gateway.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::mac::{constant_time_eq, hmac_sha256};
use crate::domain::money::{Amount, CurrencyCode};

use super::define_port_error;

define_port_error! {
    /// Failures raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The gateway could not be reached or timed out.
        Transport { message: String } => "payment gateway unreachable: {message}",
        /// The gateway answered but rejected the request.
        Rejected { message: String } => "payment gateway rejected the request: {message}",
        /// The gateway answered with a payload this adapter cannot interpret.
        Protocol { message: String } => "payment gateway protocol error: {message}",
    }
}

/// Payment state as reported by the gateway's authoritative record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    /// Payment object exists but no money movement happened yet.
    Created,
    /// Funds are reserved but not yet captured.
    Authorized,
    /// Funds were captured.
    Captured,
    /// A previously captured payment was refunded.
    Refunded,
    /// The payment terminally failed.
    Failed,
}

impl GatewayPaymentStatus {
    /// Parse the gateway's wire form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created" => Some(Self::Created),
            "authorized" => Some(Self::Authorized),
            "captured" => Some(Self::Captured),
            "refunded" => Some(Self::Refunded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Authoritative payment record fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    /// Gateway payment identifier.
    pub id: String,
    /// Gateway order the payment belongs to.
    pub order_id: String,
    /// Paid amount in minor units.
    pub amount_minor: i64,
    /// Currency of the payment.
    pub currency: String,
    /// Reported payment state.
    pub status: GatewayPaymentStatus,
}

/// Request to open a gateway order ahead of client checkout.
#[derive(Debug, Clone)]
pub struct GatewayOrderRequest {
    /// Amount to collect, in minor units.
    pub amount: Amount,
    /// Currency to collect in.
    pub currency: CurrencyCode,
    /// Local reference attached to the order for reconciliation.
    pub reference: String,
}

/// Gateway order handle returned to the client for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Gateway order identifier.
    pub id: String,
}

/// Port for the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Check that `signature` is the gateway's MAC over this order/payment
    /// pair. Purely local; never calls the network.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Open an order the client can pay against.
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError>;

    /// Fetch the authoritative record for a payment.
    async fn fetch_payment(
        &self,
        payment_id: &str,
    ) -> Result<GatewayPayment, PaymentGatewayError>;
}

/// Compute the signature material the gateway signs: `"{order_id}|{payment_id}"`.
#[must_use]
pub fn signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Verify a hex-encoded HMAC-SHA256 gateway signature.
#[must_use]
pub fn verify_hmac_signature(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = hmac_sha256(secret, signature_payload(order_id, payment_id).as_bytes());
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    constant_time_eq(&expected, &provided)
}

/// Gateway double that clears every payment, for pool-less servers and tests.
///
/// Orders are issued locally; `fetch_payment` reports the status configured
/// at construction (captured by default). Signatures use the same HMAC
/// construction as the real adapter so handler tests exercise the full
/// verification path.
#[derive(Debug)]
pub struct StubPaymentGateway {
    webhook_secret: Vec<u8>,
    payment_status: Mutex<GatewayPaymentStatus>,
}

impl StubPaymentGateway {
    /// Create a stub clearing payments as captured.
    #[must_use]
    pub fn new(webhook_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            payment_status: Mutex::new(GatewayPaymentStatus::Captured),
        }
    }

    /// Change the status reported by subsequent `fetch_payment` calls.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn report_status(&self, status: GatewayPaymentStatus) {
        *self.payment_status.lock().expect("stub gateway lock") = status;
    }

    /// Produce the signature the gateway would attach to this pair.
    #[must_use]
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hex::encode(hmac_sha256(
            &self.webhook_secret,
            signature_payload(order_id, payment_id).as_bytes(),
        ))
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_hmac_signature(&self.webhook_secret, order_id, payment_id, signature)
    }

    async fn create_order(
        &self,
        _request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError> {
        Ok(GatewayOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
        })
    }

    async fn fetch_payment(
        &self,
        payment_id: &str,
    ) -> Result<GatewayPayment, PaymentGatewayError> {
        let status = *self
            .payment_status
            .lock()
            .map_err(|_| PaymentGatewayError::protocol("stub gateway lock poisoned"))?;
        Ok(GatewayPayment {
            id: payment_id.to_owned(),
            order_id: String::new(),
            amount_minor: 0,
            currency: "INR".to_owned(),
            status,
        })
    }
}
