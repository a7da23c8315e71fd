//! Reqwest-backed payment gateway adapter.
//!
//! Owns transport details only: authentication, timeout and HTTP error
//! mapping, and JSON decoding into the domain's gateway types. Signature
//! verification is local (HMAC over the order/payment pair with the webhook
//! secret) and never touches the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroize;

use crate::domain::ports::{
    GatewayOrder, GatewayOrderRequest, GatewayPayment, GatewayPaymentStatus, PaymentGateway,
    PaymentGatewayError, verify_hmac_signature,
};

use super::dto::{CreateOrderDto, GatewayErrorDto, OrderDto, PaymentDto};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// API credentials and webhook secret for the gateway account.
pub struct GatewayCredentials {
    /// Key id sent as the basic-auth username.
    pub key_id: String,
    /// Key secret sent as the basic-auth password.
    pub key_secret: String,
    /// Secret the gateway signs callbacks with.
    pub webhook_secret: String,
}

impl Drop for GatewayCredentials {
    fn drop(&mut self) {
        self.key_secret.zeroize();
        self.webhook_secret.zeroize();
    }
}

/// Payment gateway adapter performing REST calls against one base URL.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: Url,
    key_id: String,
    key_secret: String,
    webhook_secret: Vec<u8>,
}

impl HttpPaymentGateway {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, credentials: &GatewayCredentials) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        credentials: &GatewayCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            key_id: credentials.key_id.clone(),
            key_secret: credentials.key_secret.clone(),
            webhook_secret: credentials.webhook_secret.as_bytes().to_vec(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| PaymentGatewayError::protocol(format!("invalid gateway URL: {err}")))
    }

    async fn decode_error(response: reqwest::Response) -> PaymentGatewayError {
        let status = response.status();
        let description = match response.json::<GatewayErrorDto>().await {
            Ok(envelope) if !envelope.error.description.is_empty() => envelope.error.description,
            _ => format!("gateway returned {status}"),
        };
        if status.is_server_error() {
            PaymentGatewayError::transport(description)
        } else {
            PaymentGatewayError::rejected(description)
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> PaymentGatewayError {
    PaymentGatewayError::transport(err.to_string())
}

fn parse_status(raw: &str) -> Result<GatewayPaymentStatus, PaymentGatewayError> {
    GatewayPaymentStatus::parse(raw).ok_or_else(|| {
        PaymentGatewayError::protocol(format!("unknown gateway payment status: {raw}"))
    })
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_hmac_signature(&self.webhook_secret, order_id, payment_id, signature)
    }

    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError> {
        let url = self.endpoint("v1/orders")?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderDto {
                amount: request.amount.minor(),
                currency: request.currency.as_ref(),
                receipt: &request.reference,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let order: OrderDto = response.json().await.map_err(|err| {
            PaymentGatewayError::protocol(format!("order payload did not decode: {err}"))
        })?;
        Ok(GatewayOrder { id: order.id })
    }

    async fn fetch_payment(
        &self,
        payment_id: &str,
    ) -> Result<GatewayPayment, PaymentGatewayError> {
        let url = self.endpoint(&format!("v1/payments/{payment_id}"))?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PaymentGatewayError::rejected(format!(
                "payment {payment_id} does not exist"
            )));
        }
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let payment: PaymentDto = response.json().await.map_err(|err| {
            PaymentGatewayError::protocol(format!("payment payload did not decode: {err}"))
        })?;

        Ok(GatewayPayment {
            id: payment.id,
            order_id: payment.order_id,
            amount_minor: payment.amount,
            currency: payment.currency,
            status: parse_status(&payment.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn credentials() -> GatewayCredentials {
        GatewayCredentials {
            key_id: "key_test".to_owned(),
            key_secret: "secret".to_owned(),
            webhook_secret: "whsec_test".to_owned(),
        }
    }

    fn gateway() -> HttpPaymentGateway {
        let base = Url::parse("https://gateway.invalid/").expect("valid URL");
        HttpPaymentGateway::new(base, &credentials()).expect("client builds")
    }

    #[rstest]
    fn signature_verification_matches_the_stub_construction() {
        let adapter = gateway();
        let signature = hex::encode(crate::domain::mac::hmac_sha256(
            b"whsec_test",
            b"order_1|pay_1",
        ));
        assert!(adapter.verify_signature("order_1", "pay_1", &signature));
        assert!(!adapter.verify_signature("order_1", "pay_2", &signature));
    }

    #[rstest]
    #[case("captured", true)]
    #[case("authorized", true)]
    #[case("exploded", false)]
    fn status_parsing_rejects_unknown_states(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_status(raw).is_ok(), ok);
    }

    #[rstest]
    fn endpoint_joins_relative_paths() {
        let adapter = gateway();
        let url = adapter.endpoint("v1/payments/pay_9").expect("joins");
        assert_eq!(url.as_str(), "https://gateway.invalid/v1/payments/pay_9");
    }
}
