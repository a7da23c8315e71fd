//! Diesel-backed [`DonationRepository`] adapter.
//!
//! The settle path is the one transactional write in the crate: the donation
//! row is locked (`FOR UPDATE`) so concurrent verifications of the same
//! donation serialise, and the cause aggregate increment commits or rolls
//! back with the status transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::donation::{Donation, DonationStatus, NewDonation, ReceiptNo};
use crate::domain::ports::{
    DonationPersistenceError, DonationRepository, SettleDonation, SettleOutcome,
};

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::{DonationRow, DonationSettleChangeset, NewDonationRow};
use super::pool::DbPool;
use super::schema::{causes, donations};

/// Diesel-backed donation repository.
#[derive(Clone)]
pub struct DieselDonationRepository {
    pool: DbPool,
}

impl DieselDonationRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DonationPersistenceError {
    match classify_diesel_error(error) {
        // The donations table has a unique transaction id; a violation here
        // is a programming error rather than user input.
        DieselFailure::UniqueViolation(constraint) => DonationPersistenceError::query(format!(
            "unexpected unique violation: {}",
            constraint.unwrap_or_default()
        )),
        DieselFailure::Connection(message) => DonationPersistenceError::connection(message),
        DieselFailure::Query(message) => DonationPersistenceError::query(message),
    }
}

fn row_to_donation(row: DonationRow) -> Result<Donation, DonationPersistenceError> {
    Donation::try_from(row).map_err(DonationPersistenceError::query)
}

#[async_trait]
impl DonationRepository for DieselDonationRepository {
    async fn create(
        &self,
        donation: &NewDonation,
        created_at: DateTime<Utc>,
    ) -> Result<Donation, DonationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DonationPersistenceError::connection(pool_error_message(err)))?;

        let id = Uuid::new_v4();
        let row = NewDonationRow {
            id,
            amount_minor: donation.amount.minor(),
            currency: donation.currency.as_ref(),
            donor_name: &donation.donor_name,
            donor_email: &donation.donor_email,
            cause_id: donation.cause_id,
            transaction_id: &donation.order_id,
            status: DonationStatus::Pending.as_str(),
            anonymous: donation.anonymous,
            dedication: donation.dedication.as_deref(),
            created_at,
            updated_at: created_at,
        };

        let stored: DonationRow = diesel::insert_into(donations::table)
            .values(&row)
            .returning(DonationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_donation(stored)
    }

    async fn settle(
        &self,
        request: &SettleDonation,
    ) -> Result<SettleOutcome, DonationPersistenceError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DonationPersistenceError::connection(pool_error_message(err)))?;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    // A replayed callback arrives after the transaction id
                    // was already rewritten to the payment id, so match both.
                    let row: Option<DonationRow> = donations::table
                        .filter(
                            donations::transaction_id
                                .eq(&request.order_id)
                                .or(donations::transaction_id.eq(&request.payment_id)),
                        )
                        .select(DonationRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    let Some(row) = row else {
                        return Ok(SettleOutcomeRows::NotFound);
                    };

                    let was_successful = row.status == DonationStatus::Successful.as_str();
                    let new_status = if was_successful {
                        DonationStatus::Successful
                    } else {
                        request.status
                    };
                    let first_success =
                        !was_successful && new_status == DonationStatus::Successful;

                    let receipt = (row.receipt_no.is_none()
                        && new_status == DonationStatus::Successful)
                        .then(|| ReceiptNo::derive(row.id, request.settled_at));

                    diesel::update(donations::table.find(row.id))
                        .set(&DonationSettleChangeset {
                            transaction_id: &request.payment_id,
                            status: new_status.as_str(),
                            receipt_no: receipt.as_ref().map(AsRef::as_ref),
                            updated_at: request.settled_at,
                        })
                        .execute(conn)
                        .await?;

                    let cause_updated = match (first_success, row.cause_id) {
                        (true, Some(cause_id)) => {
                            diesel::update(causes::table.find(cause_id))
                                .set((
                                    causes::raised_minor
                                        .eq(causes::raised_minor + row.amount_minor),
                                    causes::donors_count.eq(causes::donors_count + 1),
                                    causes::updated_at.eq(request.settled_at),
                                ))
                                .execute(conn)
                                .await?;
                            true
                        }
                        _ => false,
                    };

                    let settled: DonationRow = donations::table
                        .find(row.id)
                        .select(DonationRow::as_select())
                        .first(conn)
                        .await?;

                    Ok(SettleOutcomeRows::Settled {
                        row: settled,
                        cause_updated,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            SettleOutcomeRows::NotFound => Ok(SettleOutcome::NotFound),
            SettleOutcomeRows::Settled { row, cause_updated } => Ok(SettleOutcome::Settled {
                donation: row_to_donation(row)?,
                cause_updated,
            }),
        }
    }
}

/// Transaction-internal outcome carrying the raw row; conversion to the
/// domain type happens outside so conversion failures do not roll back the
/// committed settle.
enum SettleOutcomeRows {
    NotFound,
    Settled {
        row: DonationRow,
        cause_updated: bool,
    },
}
