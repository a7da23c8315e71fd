//! Diesel-backed [`MessageRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::message::{Message, NewMessage};
use crate::domain::ports::{MessagePersistenceError, MessageRepository};

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::NewMessageRow;
use super::pool::DbPool;
use super::schema::messages;

/// Diesel-backed form submission repository.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> MessagePersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => MessagePersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) | DieselFailure::Query(_) => {
            MessagePersistenceError::query("database error")
        }
    }
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn create(
        &self,
        message: &NewMessage,
        created_at: DateTime<Utc>,
    ) -> Result<Message, MessagePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| MessagePersistenceError::connection(pool_error_message(err)))?;

        let row = NewMessageRow {
            id: Uuid::new_v4(),
            kind: message.kind.as_str(),
            name: &message.name,
            email: &message.email,
            phone: message.phone.as_deref(),
            subject: message.subject.as_deref(),
            body: &message.body,
            created_at,
        };

        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row.into_message(message.kind))
    }
}
