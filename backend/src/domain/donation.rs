//! Donation ledger model.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::{Amount, CurrencyCode};

/// Lifecycle of a donation as reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Created locally; the gateway has not confirmed payment yet.
    Pending,
    /// The gateway captured or authorised the payment.
    Successful,
    /// The gateway reported a terminal failure.
    Failed,
}

impl DonationStatus {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "successful" => Some(Self::Successful),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable receipt identifier, assigned once per successful donation
/// and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptNo(String);

impl ReceiptNo {
    /// Derive the receipt number candidate for a donation.
    ///
    /// The value is deterministic for a given donation and settlement year,
    /// so retried settlements propose the same receipt and the
    /// assign-once persistence rule keeps whichever landed first.
    #[must_use]
    pub fn derive(donation_id: Uuid, settled_at: DateTime<Utc>) -> Self {
        let short = donation_id.simple().to_string();
        let prefix: String = short.chars().take(10).collect();
        Self(format!(
            "RCPT-{}-{}",
            settled_at.year(),
            prefix.to_ascii_uppercase()
        ))
    }

    /// Wrap a stored receipt number without re-deriving it.
    #[must_use]
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for ReceiptNo {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReceiptNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A single contribution record.
///
/// ## Invariants
/// - `transaction_id` holds the gateway order id while `Pending` and the
///   gateway payment id after settlement.
/// - The transition to [`DonationStatus::Successful`] happens at most once
///   and is the only event that moves the parent cause's aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    /// Stable donation identifier.
    pub id: Uuid,
    /// Contribution amount in minor currency units.
    pub amount: Amount,
    /// ISO 4217 currency of the contribution.
    pub currency: CurrencyCode,
    /// Donor's name as entered on the form.
    pub donor_name: String,
    /// Donor's contact email for the receipt.
    pub donor_email: String,
    /// Cause this contribution funds, when not a general donation.
    pub cause_id: Option<Uuid>,
    /// Gateway order id (pending) or payment id (settled).
    pub transaction_id: String,
    /// Settlement state.
    pub status: DonationStatus,
    /// Receipt number, present once the donation settled successfully.
    pub receipt_no: Option<ReceiptNo>,
    /// Whether the donor asked not to be named publicly.
    pub anonymous: bool,
    /// Optional free-text dedication shown with the donation.
    pub dedication: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for recording a pending donation.
#[derive(Debug, Clone)]
pub struct NewDonation {
    /// Contribution amount in minor currency units.
    pub amount: Amount,
    /// ISO 4217 currency of the contribution.
    pub currency: CurrencyCode,
    /// Donor's name as entered on the form.
    pub donor_name: String,
    /// Donor's contact email for the receipt.
    pub donor_email: String,
    /// Cause this contribution funds, when not a general donation.
    pub cause_id: Option<Uuid>,
    /// Gateway order id the donation was created against.
    pub order_id: String,
    /// Whether the donor asked not to be named publicly.
    pub anonymous: bool,
    /// Optional free-text dedication.
    pub dedication: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn status_round_trips_through_stored_form() {
        for status in [
            DonationStatus::Pending,
            DonationStatus::Successful,
            DonationStatus::Failed,
        ] {
            assert_eq!(DonationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DonationStatus::parse("settled"), None);
    }

    #[rstest]
    fn receipt_numbers_are_deterministic_per_donation() {
        let id = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).single().expect("valid time");
        let first = ReceiptNo::derive(id, at);
        let second = ReceiptNo::derive(id, at);
        assert_eq!(first, second);
        assert_eq!(first.as_ref(), "RCPT-2026-0000000000");
    }

    #[rstest]
    fn receipt_numbers_differ_between_donations() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).single().expect("valid time");
        let first = ReceiptNo::derive(Uuid::new_v4(), at);
        let second = ReceiptNo::derive(Uuid::new_v4(), at);
        assert_ne!(first, second);
    }
}
