//! Driven port for user account persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::{EmailAddress, NewUser, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns this email address.
        DuplicateEmail => "an account with this email already exists",
        /// Another account already owns this phone number.
        DuplicatePhone => "an account with this phone number already exists",
    }
}

/// Port for user account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an account, enforcing email and phone uniqueness.
    async fn create(
        &self,
        user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch an account by its normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by its identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError>;
}

/// In-memory user store used without a database pool and in tests.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().expect("user store lock").len()
    }

    /// Whether the store holds no accounts.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(
        &self,
        user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))?;

        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        if let Some(phone) = &user.phone {
            if users
                .iter()
                .any(|existing| existing.phone.as_ref() == Some(phone))
            {
                return Err(UserPersistenceError::DuplicatePhone);
            }
        }

        let record = User {
            id: Uuid::new_v4(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            email_verified: false,
            phone_verified: false,
            created_at,
            updated_at: created_at,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))?;
        Ok(users.iter().find(|user| &user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))?;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    fn new_user(email: &str, phone: Option<&str>) -> NewUser {
        NewUser {
            display_name: "Asha".to_owned(),
            email: EmailAddress::new(email).expect("valid email"),
            phone: phone.map(|raw| {
                crate::domain::user::PhoneNumber::new(raw).expect("valid phone")
            }),
            password_hash: "$argon2id$stub".to_owned(),
            role: UserRole::Supporter,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email_without_adding_a_record() {
        let store = InMemoryUserStore::new();
        store
            .create(&new_user("asha@example.org", None), Utc::now())
            .await
            .expect("first account stored");

        let error = store
            .create(&new_user("Asha@Example.org", None), Utc::now())
            .await
            .expect_err("duplicate email must fail");

        assert_eq!(error, UserPersistenceError::DuplicateEmail);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_phone() {
        let store = InMemoryUserStore::new();
        store
            .create(&new_user("asha@example.org", Some("+918012345678")), Utc::now())
            .await
            .expect("first account stored");

        let error = store
            .create(&new_user("ravi@example.org", Some("+91 80 1234 5678")), Utc::now())
            .await
            .expect_err("duplicate phone must fail");

        assert_eq!(error, UserPersistenceError::DuplicatePhone);
    }

    #[tokio::test]
    async fn find_by_email_matches_normalised_address() {
        let store = InMemoryUserStore::new();
        store
            .create(&new_user("asha@example.org", None), Utc::now())
            .await
            .expect("account stored");

        let lookup = EmailAddress::new("  ASHA@example.org").expect("valid email");
        let found = store
            .find_by_email(&lookup)
            .await
            .expect("lookup succeeds");
        assert!(found.is_some());
    }
}
