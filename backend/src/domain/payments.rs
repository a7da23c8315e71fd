//! Donation intake and payment verification services.
//!
//! `DonationCommandService` implements the [`DonationCommand`] driving port
//! over three driven ports: the payment gateway, the donation repository,
//! and the cause directory. The verification path is the one place in the
//! crate that mutates money aggregates; everything it persists goes through
//! the repository's single atomic settle operation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::cause::CauseStatus;
use crate::domain::donation::{DonationStatus, NewDonation};
use crate::domain::error::Error;
use crate::domain::ports::{
    CausePersistenceError, CauseRepository, CreateDonationRequest, CreateDonationResponse,
    DonationCommand, DonationPersistenceError, DonationRepository, GatewayOrderRequest,
    GatewayPaymentStatus, PaymentGateway, PaymentGatewayError, SettleDonation, SettleOutcome,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::domain::sanitize::{SanitizeError, sanitize_email, sanitize_html, sanitize_text};
use crate::domain::slug::Slug;

/// Longest accepted donor name.
const DONOR_NAME_MAX: usize = 100;
/// Longest accepted dedication text.
const DEDICATION_MAX: usize = 500;

fn map_sanitize_error(err: &SanitizeError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

fn map_gateway_error(err: PaymentGatewayError) -> Error {
    match err {
        PaymentGatewayError::Transport { message } => {
            warn!(%message, "payment gateway unreachable");
            Error::service_unavailable("payment gateway is unavailable")
        }
        PaymentGatewayError::Rejected { message } => {
            info!(%message, "payment gateway rejected the request");
            Error::payment_failed("payment could not be completed")
        }
        PaymentGatewayError::Protocol { message } => {
            warn!(%message, "payment gateway protocol error");
            Error::internal(message)
        }
    }
}

fn map_donation_persistence_error(err: DonationPersistenceError) -> Error {
    match err {
        DonationPersistenceError::Connection { message } => Error::service_unavailable(message),
        DonationPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Map the gateway's authoritative payment state onto the local ledger
/// status: captured and authorised payments settle successfully, anything
/// else settles as failed.
fn settlement_status(status: GatewayPaymentStatus) -> DonationStatus {
    match status {
        GatewayPaymentStatus::Captured | GatewayPaymentStatus::Authorized => {
            DonationStatus::Successful
        }
        GatewayPaymentStatus::Created
        | GatewayPaymentStatus::Refunded
        | GatewayPaymentStatus::Failed => DonationStatus::Failed,
    }
}

/// Donation flow service implementing the [`DonationCommand`] driving port.
pub struct DonationCommandService<G, D, C> {
    gateway: Arc<G>,
    donations: Arc<D>,
    causes: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<G, D, C> DonationCommandService<G, D, C>
where
    G: ?Sized,
    D: ?Sized,
    C: ?Sized,
{
    /// Create a service over the gateway, repositories, and clock.
    pub fn new(gateway: Arc<G>, donations: Arc<D>, causes: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            donations,
            causes,
            clock,
        }
    }
}

impl<G, D, C> DonationCommandService<G, D, C>
where
    G: PaymentGateway + ?Sized,
    D: DonationRepository + ?Sized,
    C: CauseRepository + ?Sized,
{
    async fn resolve_cause(&self, slug: &Slug) -> Result<uuid::Uuid, Error> {
        let cause = self
            .causes
            .find_by_slug(slug)
            .await
            .map_err(|err| match err {
                CausePersistenceError::Connection { message } => {
                    Error::service_unavailable(message)
                }
                CausePersistenceError::Query { message } => Error::internal(message),
            })?
            .ok_or_else(|| {
                Error::invalid_request(format!("unknown cause: {slug}"))
                    .with_details(json!({ "field": "causeSlug", "code": "unknown_cause" }))
            })?;

        if cause.status != CauseStatus::Active {
            return Err(Error::conflict("this cause is not accepting donations")
                .with_details(json!({ "field": "causeSlug", "code": "cause_closed" })));
        }
        Ok(cause.id)
    }

    async fn settle(
        &self,
        request: &VerifyPaymentRequest,
        status: DonationStatus,
        settled_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let outcome = self
            .donations
            .settle(&SettleDonation {
                order_id: request.order_id.clone(),
                payment_id: request.payment_id.clone(),
                status,
                settled_at,
            })
            .await
            .map_err(map_donation_persistence_error)?;

        match outcome {
            SettleOutcome::Settled {
                donation,
                cause_updated,
            } => {
                info!(
                    donation_id = %donation.id,
                    payment_id = %request.payment_id,
                    status = %donation.status,
                    cause_updated,
                    "donation settled"
                );
            }
            SettleOutcome::NotFound => {
                // The gateway payment is real but no local donation matches.
                // Accept the callback so the gateway stops retrying, and flag
                // the orphan loudly for reconciliation.
                warn!(
                    order_id = %request.order_id,
                    payment_id = %request.payment_id,
                    "no donation matched gateway order id; flagged for reconciliation"
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<G, D, C> DonationCommand for DonationCommandService<G, D, C>
where
    G: PaymentGateway + ?Sized,
    D: DonationRepository + ?Sized,
    C: CauseRepository + ?Sized,
{
    async fn create_donation(
        &self,
        request: CreateDonationRequest,
    ) -> Result<CreateDonationResponse, Error> {
        let donor_name = sanitize_text("donorName", &request.donor_name, DONOR_NAME_MAX)
            .map_err(|err| map_sanitize_error(&err))?;
        let donor_email =
            sanitize_email(&request.donor_email).map_err(|err| map_sanitize_error(&err))?;
        // Dedications may carry the inline-markup subset, so they go through
        // the HTML allow-list rather than the plain-text escaper.
        let dedication = match request.dedication.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                if raw.chars().count() > DEDICATION_MAX {
                    return Err(map_sanitize_error(&SanitizeError::TooLong {
                        field: "dedication",
                        max: DEDICATION_MAX,
                    }));
                }
                Some(sanitize_html(raw))
            }
        };

        let cause_id = match &request.cause_slug {
            Some(slug) => Some(self.resolve_cause(slug).await?),
            None => None,
        };

        let order = self
            .gateway
            .create_order(&GatewayOrderRequest {
                amount: request.amount,
                currency: request.currency.clone(),
                reference: donor_email.clone(),
            })
            .await
            .map_err(map_gateway_error)?;

        let donation = self
            .donations
            .create(
                &NewDonation {
                    amount: request.amount,
                    currency: request.currency,
                    donor_name,
                    donor_email,
                    cause_id,
                    order_id: order.id.clone(),
                    anonymous: request.anonymous,
                    dedication,
                },
                self.clock.utc(),
            )
            .await
            .map_err(map_donation_persistence_error)?;

        info!(
            donation_id = %donation.id,
            order_id = %order.id,
            amount_minor = donation.amount.minor(),
            "donation opened"
        );

        Ok(CreateDonationResponse {
            donation_id: donation.id,
            order_id: order.id,
            amount_minor: donation.amount.minor(),
            currency: donation.currency.to_string(),
        })
    }

    async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, Error> {
        if !self.gateway.verify_signature(
            &request.order_id,
            &request.payment_id,
            &request.signature,
        ) {
            warn!(
                order_id = %request.order_id,
                payment_id = %request.payment_id,
                "payment signature verification failed"
            );
            return Err(Error::invalid_request("payment signature verification failed")
                .with_details(json!({ "field": "signature", "code": "invalid_signature" })));
        }

        let payment = self
            .gateway
            .fetch_payment(&request.payment_id)
            .await
            .map_err(map_gateway_error)?;

        // The gateway record is authoritative; a payment fetched for a
        // different order than the one signed is a forged or confused call.
        if !payment.order_id.is_empty() && payment.order_id != request.order_id {
            return Err(
                Error::invalid_request("payment does not belong to this order").with_details(
                    json!({ "field": "orderId", "code": "order_mismatch" }),
                ),
            );
        }

        let status = settlement_status(payment.status);
        self.settle(&request, status, self.clock.utc()).await?;

        Ok(VerifyPaymentResponse {
            success: true,
            payment_id: request.payment_id,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::money::{Amount, CurrencyCode};
    use crate::domain::ports::{InMemoryCauseDirectory, InMemoryDonationStore, StubPaymentGateway};
    use mockable::DefaultClock;
    use rstest::rstest;

    const SECRET: &[u8] = b"whsec_test";

    fn service(
        gateway_status: GatewayPaymentStatus,
    ) -> (
        DonationCommandService<StubPaymentGateway, InMemoryDonationStore, InMemoryCauseDirectory>,
        Arc<StubPaymentGateway>,
        Arc<InMemoryDonationStore>,
        uuid::Uuid,
    ) {
        let gateway = Arc::new(StubPaymentGateway::new(SECRET.to_vec()));
        gateway.report_status(gateway_status);
        let donations = Arc::new(InMemoryDonationStore::new());
        let cause = InMemoryCauseDirectory::sample_cause("clean-water");
        let cause_id = cause.id;
        let causes = Arc::new(InMemoryCauseDirectory::with_causes(vec![cause]));
        let service = DonationCommandService::new(
            gateway.clone(),
            donations.clone(),
            causes,
            Arc::new(DefaultClock),
        );
        (service, gateway, donations, cause_id)
    }

    fn create_request(cause_slug: Option<&str>) -> CreateDonationRequest {
        CreateDonationRequest {
            amount: Amount::from_minor(25_000).expect("valid amount"),
            currency: CurrencyCode::new("INR").expect("valid currency"),
            donor_name: "Asha Rao".to_owned(),
            donor_email: "Asha@Example.org".to_owned(),
            cause_slug: cause_slug.map(|slug| Slug::new(slug).expect("valid slug")),
            anonymous: false,
            dedication: Some("In memory of <b>Nan</b>".to_owned()),
        }
    }

    async fn open_donation(
        service: &DonationCommandService<
            StubPaymentGateway,
            InMemoryDonationStore,
            InMemoryCauseDirectory,
        >,
    ) -> CreateDonationResponse {
        service
            .create_donation(create_request(Some("clean-water")))
            .await
            .expect("donation opens")
    }

    #[tokio::test]
    async fn create_donation_normalises_donor_fields() {
        let (service, _gateway, donations, _cause_id) = service(GatewayPaymentStatus::Captured);
        let response = open_donation(&service).await;

        let stored = donations
            .find_by_transaction_id(&response.order_id)
            .expect("donation recorded");
        assert_eq!(stored.donor_email, "asha@example.org");
        assert_eq!(stored.status, DonationStatus::Pending);
        assert_eq!(stored.dedication.as_deref(), Some("In memory of <b>Nan</b>"));
    }

    #[tokio::test]
    async fn create_donation_rejects_unknown_cause() {
        let (service, _gateway, _donations, _cause_id) = service(GatewayPaymentStatus::Captured);
        let error = service
            .create_donation(create_request(Some("no-such-cause")))
            .await
            .expect_err("unknown cause must fail");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn verify_settles_and_increments_cause_exactly_once() {
        let (service, gateway, donations, cause_id) = service(GatewayPaymentStatus::Captured);
        let opened = open_donation(&service).await;
        let signature = gateway.sign(&opened.order_id, "pay_1");
        let request = VerifyPaymentRequest {
            order_id: opened.order_id.clone(),
            payment_id: "pay_1".to_owned(),
            signature,
        };

        let first = service
            .verify_payment(request.clone())
            .await
            .expect("verification succeeds");
        assert!(first.success);
        assert_eq!(first.status, DonationStatus::Successful);

        let replay = service
            .verify_payment(request)
            .await
            .expect("replay succeeds");
        assert!(replay.success);

        let totals = donations.cause_totals(cause_id);
        assert_eq!(totals.raised_minor, 25_000);
        assert_eq!(totals.donors_count, 1);
    }

    #[tokio::test]
    async fn verify_rejects_tampered_signature_without_mutation() {
        let (service, gateway, donations, cause_id) = service(GatewayPaymentStatus::Captured);
        let opened = open_donation(&service).await;
        let mut signature = gateway.sign(&opened.order_id, "pay_1");
        signature.replace_range(0..1, if signature.starts_with('0') { "1" } else { "0" });

        let error = service
            .verify_payment(VerifyPaymentRequest {
                order_id: opened.order_id.clone(),
                payment_id: "pay_1".to_owned(),
                signature,
            })
            .await
            .expect_err("tampered signature must fail");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let untouched = donations
            .find_by_transaction_id(&opened.order_id)
            .expect("donation still pending");
        assert_eq!(untouched.status, DonationStatus::Pending);
        assert_eq!(donations.cause_totals(cause_id).donors_count, 0);
    }

    #[rstest]
    #[case(GatewayPaymentStatus::Failed)]
    #[case(GatewayPaymentStatus::Created)]
    #[case(GatewayPaymentStatus::Refunded)]
    #[tokio::test]
    async fn verify_marks_unsuccessful_states_failed(#[case] gateway_status: GatewayPaymentStatus) {
        let (service, gateway, donations, cause_id) = service(gateway_status);
        let opened = open_donation(&service).await;
        let signature = gateway.sign(&opened.order_id, "pay_1");

        let response = service
            .verify_payment(VerifyPaymentRequest {
                order_id: opened.order_id.clone(),
                payment_id: "pay_1".to_owned(),
                signature,
            })
            .await
            .expect("verification completes");

        assert_eq!(response.status, DonationStatus::Failed);
        assert_eq!(donations.cause_totals(cause_id).donors_count, 0);
    }

    #[tokio::test]
    async fn verify_reports_success_for_unmatched_order() {
        let (service, gateway, _donations, _cause_id) = service(GatewayPaymentStatus::Captured);
        let signature = gateway.sign("order_unknown", "pay_1");

        let response = service
            .verify_payment(VerifyPaymentRequest {
                order_id: "order_unknown".to_owned(),
                payment_id: "pay_1".to_owned(),
                signature,
            })
            .await
            .expect("verification completes despite missing donation");

        assert!(response.success);
    }
}
