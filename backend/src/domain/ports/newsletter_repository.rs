//! Driven port for newsletter subscription persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by newsletter repository adapters.
    pub enum NewsletterPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "newsletter repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "newsletter repository query failed: {message}",
        /// The address is already subscribed.
        Duplicate => "this email is already subscribed",
    }
}

/// Port for newsletter subscription persistence.
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Record a subscription, enforcing email uniqueness.
    async fn subscribe(
        &self,
        email: &EmailAddress,
        subscribed_at: DateTime<Utc>,
    ) -> Result<Uuid, NewsletterPersistenceError>;
}

/// In-memory subscription list used without a database pool and in tests.
#[derive(Debug, Default)]
pub struct InMemorySubscriberList {
    subscribers: Mutex<Vec<(Uuid, EmailAddress)>>,
}

impl InMemorySubscriberList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscriptions.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.lock().expect("subscriber list lock").len()
    }

    /// Whether the list holds no subscriptions.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NewsletterRepository for InMemorySubscriberList {
    async fn subscribe(
        &self,
        email: &EmailAddress,
        _subscribed_at: DateTime<Utc>,
    ) -> Result<Uuid, NewsletterPersistenceError> {
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| NewsletterPersistenceError::query("subscriber list lock poisoned"))?;
        if subscribers.iter().any(|(_, existing)| existing == email) {
            return Err(NewsletterPersistenceError::Duplicate);
        }
        let id = Uuid::new_v4();
        subscribers.push((id, email.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_rejects_duplicates() {
        let list = InMemorySubscriberList::new();
        let email = EmailAddress::new("reader@example.org").expect("valid email");

        list.subscribe(&email, Utc::now())
            .await
            .expect("first subscription stored");
        let error = list
            .subscribe(&email, Utc::now())
            .await
            .expect_err("duplicate must fail");

        assert_eq!(error, NewsletterPersistenceError::Duplicate);
        assert_eq!(list.len(), 1);
    }
}
