//! Diesel-backed [`NewsletterRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NewsletterPersistenceError, NewsletterRepository};
use crate::domain::user::EmailAddress;

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::NewSubscriberRow;
use super::pool::DbPool;
use super::schema::newsletter_subscribers;

/// Diesel-backed newsletter repository.
#[derive(Clone)]
pub struct DieselNewsletterRepository {
    pool: DbPool,
}

impl DieselNewsletterRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> NewsletterPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::UniqueViolation(_) => NewsletterPersistenceError::Duplicate,
        DieselFailure::Connection(message) => NewsletterPersistenceError::connection(message),
        DieselFailure::Query(message) => NewsletterPersistenceError::query(message),
    }
}

#[async_trait]
impl NewsletterRepository for DieselNewsletterRepository {
    async fn subscribe(
        &self,
        email: &EmailAddress,
        subscribed_at: DateTime<Utc>,
    ) -> Result<Uuid, NewsletterPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| NewsletterPersistenceError::connection(pool_error_message(err)))?;

        let row = NewSubscriberRow {
            id: Uuid::new_v4(),
            email: email.as_ref(),
            subscribed_at,
        };

        diesel::insert_into(newsletter_subscribers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row.id)
    }
}
