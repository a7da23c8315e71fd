//! Driving port for donation intake and payment verification.
//!
//! Inbound adapters call this port to run the donation flows without knowing
//! the backing gateway or persistence. Handler tests substitute a double
//! instead of wiring either.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::donation::DonationStatus;
use crate::domain::error::Error;
use crate::domain::money::{Amount, CurrencyCode};
use crate::domain::slug::Slug;

/// Request to open a donation ahead of client checkout.
#[derive(Debug, Clone)]
pub struct CreateDonationRequest {
    /// Contribution amount in minor units.
    pub amount: Amount,
    /// Currency of the contribution.
    pub currency: CurrencyCode,
    /// Donor's name, raw from the form.
    pub donor_name: String,
    /// Donor's email, raw from the form.
    pub donor_email: String,
    /// Cause to fund, when not a general donation.
    pub cause_slug: Option<Slug>,
    /// Whether the donor asked not to be named publicly.
    pub anonymous: bool,
    /// Optional free-text dedication, raw from the form.
    pub dedication: Option<String>,
}

/// Result of opening a donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDonationResponse {
    /// Identifier of the pending donation record.
    pub donation_id: Uuid,
    /// Gateway order id the client pays against.
    pub order_id: String,
    /// Echoed amount in minor units.
    pub amount_minor: i64,
    /// Echoed currency code.
    pub currency: String,
}

/// Gateway callback payload for payment verification.
#[derive(Debug, Clone)]
pub struct VerifyPaymentRequest {
    /// Gateway order id.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    /// Gateway signature over the order/payment pair.
    pub signature: String,
}

/// Result of verifying a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPaymentResponse {
    /// Whether the verification flow completed. True even when no local
    /// donation matched; the mismatch is logged for reconciliation.
    pub success: bool,
    /// Echoed gateway payment id.
    pub payment_id: String,
    /// Settlement status derived from the gateway's payment state.
    pub status: DonationStatus,
}

/// Domain use-case port for the donation flows.
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Open a gateway order and record the pending donation.
    async fn create_donation(
        &self,
        request: CreateDonationRequest,
    ) -> Result<CreateDonationResponse, Error>;

    /// Verify a gateway callback and settle the matching donation.
    async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, Error>;
}
