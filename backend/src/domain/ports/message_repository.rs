//! Driven port for form submission persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::message::{Message, NewMessage};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by message repository adapters.
    pub enum MessagePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

/// Port for form submission persistence.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a sanitised form submission.
    async fn create(
        &self,
        message: &NewMessage,
        created_at: DateTime<Utc>,
    ) -> Result<Message, MessagePersistenceError>;
}

/// In-memory inbox used without a database pool and in tests.
#[derive(Debug, Default)]
pub struct InMemoryInbox {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryInbox {
    /// Create an empty inbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored messages, newest last.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().expect("inbox lock").clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryInbox {
    async fn create(
        &self,
        message: &NewMessage,
        created_at: DateTime<Utc>,
    ) -> Result<Message, MessagePersistenceError> {
        let record = Message {
            id: Uuid::new_v4(),
            kind: message.kind,
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            created_at,
        };
        self.messages
            .lock()
            .map_err(|_| MessagePersistenceError::query("inbox lock poisoned"))?
            .push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageKind;

    #[tokio::test]
    async fn create_assigns_an_id_and_stores_the_message() {
        let inbox = InMemoryInbox::new();
        let message = NewMessage {
            kind: MessageKind::Volunteer,
            name: "Asha".to_owned(),
            email: "asha@example.org".to_owned(),
            phone: None,
            subject: Some("Weekend availability".to_owned()),
            body: "Happy to help at the food drive.".to_owned(),
        };

        let stored = inbox
            .create(&message, Utc::now())
            .await
            .expect("message stored");

        assert_eq!(stored.kind, MessageKind::Volunteer);
        assert_eq!(inbox.messages().len(), 1);
    }
}
