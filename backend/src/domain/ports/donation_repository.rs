//! Driven port for donation persistence, including the atomic settle step.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::donation::{Donation, DonationStatus, NewDonation, ReceiptNo};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by donation repository adapters.
    pub enum DonationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "donation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "donation repository query failed: {message}",
    }
}

/// Settlement instruction produced by the payment verification flow.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleDonation {
    /// Gateway order id the donation was created against.
    pub order_id: String,
    /// Gateway payment id replacing the order id as the transaction id.
    pub payment_id: String,
    /// Status derived from the gateway's authoritative payment state.
    pub status: DonationStatus,
    /// Settlement timestamp used for `updated_at` and receipt derivation.
    pub settled_at: DateTime<Utc>,
}

/// Result of applying a [`SettleDonation`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// No donation carries the given order id as its transaction id.
    NotFound,
    /// The donation was settled (or re-settled idempotently).
    Settled {
        /// The donation after the update.
        donation: Donation,
        /// Whether this call moved the parent cause's aggregates. False on
        /// replays, failed settlements, and donations without a cause.
        cause_updated: bool,
    },
}

/// Port for donation persistence.
///
/// `settle` must run as one atomic unit: the status transition, the receipt
/// assignment, and the cause aggregate increment commit or roll back
/// together, and concurrent settlements of the same donation are serialised
/// so the increment happens at most once.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Record a pending donation carrying the gateway order id.
    async fn create(
        &self,
        donation: &NewDonation,
        created_at: DateTime<Utc>,
    ) -> Result<Donation, DonationPersistenceError>;

    /// Apply a settlement: update the transaction id and status, assign a
    /// receipt number if none exists, and increment the cause aggregates iff
    /// the donation transitions into [`DonationStatus::Successful`] for the
    /// first time.
    async fn settle(
        &self,
        request: &SettleDonation,
    ) -> Result<SettleOutcome, DonationPersistenceError>;
}

/// In-memory donation store with full settle semantics.
///
/// Backs the server when no database pool is configured and the handler
/// tests that exercise the verification flow end to end. The cause ledger is
/// a plain map of aggregates, enough to observe the increment-once rule.
#[derive(Debug, Default)]
pub struct InMemoryDonationStore {
    state: Mutex<InMemoryDonationState>,
}

#[derive(Debug, Default)]
struct InMemoryDonationState {
    donations: Vec<Donation>,
    cause_totals: HashMap<Uuid, CauseTotals>,
}

/// Aggregate counters tracked per cause by [`InMemoryDonationStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CauseTotals {
    /// Cumulative amount raised in minor units.
    pub raised_minor: i64,
    /// Cumulative count of successful donations.
    pub donors_count: i64,
}

impl InMemoryDonationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates recorded for a cause, zero when untouched.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn cause_totals(&self, cause_id: Uuid) -> CauseTotals {
        self.state
            .lock()
            .expect("donation store lock")
            .cause_totals
            .get(&cause_id)
            .copied()
            .unwrap_or_default()
    }

    /// Find a stored donation by its current transaction id.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn find_by_transaction_id(&self, transaction_id: &str) -> Option<Donation> {
        self.state
            .lock()
            .expect("donation store lock")
            .donations
            .iter()
            .find(|donation| donation.transaction_id == transaction_id)
            .cloned()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationStore {
    async fn create(
        &self,
        donation: &NewDonation,
        created_at: DateTime<Utc>,
    ) -> Result<Donation, DonationPersistenceError> {
        let record = Donation {
            id: Uuid::new_v4(),
            amount: donation.amount,
            currency: donation.currency.clone(),
            donor_name: donation.donor_name.clone(),
            donor_email: donation.donor_email.clone(),
            cause_id: donation.cause_id,
            transaction_id: donation.order_id.clone(),
            status: DonationStatus::Pending,
            receipt_no: None,
            anonymous: donation.anonymous,
            dedication: donation.dedication.clone(),
            created_at,
            updated_at: created_at,
        };
        let mut state = self
            .state
            .lock()
            .map_err(|_| DonationPersistenceError::query("donation store lock poisoned"))?;
        state.donations.push(record.clone());
        Ok(record)
    }

    async fn settle(
        &self,
        request: &SettleDonation,
    ) -> Result<SettleOutcome, DonationPersistenceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DonationPersistenceError::query("donation store lock poisoned"))?;

        let Some(donation) = state.donations.iter_mut().find(|donation| {
            donation.transaction_id == request.order_id
                || donation.transaction_id == request.payment_id
        }) else {
            return Ok(SettleOutcome::NotFound);
        };

        let was_successful = donation.status == DonationStatus::Successful;
        donation.transaction_id = request.payment_id.clone();
        if !was_successful {
            donation.status = request.status;
        }
        if donation.receipt_no.is_none() && donation.status == DonationStatus::Successful {
            donation.receipt_no = Some(ReceiptNo::derive(donation.id, request.settled_at));
        }
        donation.updated_at = request.settled_at;

        let first_success = !was_successful && donation.status == DonationStatus::Successful;
        let settled = donation.clone();

        let cause_updated = match (first_success, settled.cause_id) {
            (true, Some(cause_id)) => {
                let totals = state.cause_totals.entry(cause_id).or_default();
                totals.raised_minor = totals.raised_minor.saturating_add(settled.amount.minor());
                totals.donors_count = totals.donors_count.saturating_add(1);
                true
            }
            _ => false,
        };

        Ok(SettleOutcome::Settled {
            donation: settled,
            cause_updated,
        })
    }
}
