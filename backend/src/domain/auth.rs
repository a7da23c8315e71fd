//! Signup and login service over the user repository.
//!
//! Both paths use salted argon2 hashes; there is no plaintext comparison
//! anywhere. Login failures collapse to one message so callers cannot probe
//! which of email or password was wrong.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::error::Error;
use crate::domain::password::{hash_password, verify_password};
use crate::domain::ports::{
    AuthCommand, LoginRequest, SignupRequest, UserPersistenceError, UserRepository,
};
use crate::domain::sanitize::{SanitizeError, sanitize_text};
use crate::domain::user::{DISPLAY_NAME_MAX, EmailAddress, NewUser, PhoneNumber, User, UserRole};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 8;

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_sanitize_error(field: &'static str, err: &SanitizeError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": err.code(),
    }))
}

fn map_user_persistence_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => {
            Error::conflict("an account with this email already exists")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
        UserPersistenceError::DuplicatePhone => {
            Error::conflict("an account with this phone number already exists")
                .with_details(json!({ "field": "phone", "code": "duplicate_phone" }))
        }
    }
}

/// Authentication service implementing the [`AuthCommand`] driving port.
pub struct AuthCommandService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized> AuthCommandService<U> {
    /// Create a service over the user repository and clock.
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

#[async_trait]
impl<U> AuthCommand for AuthCommandService<U>
where
    U: UserRepository + ?Sized,
{
    async fn signup(&self, request: SignupRequest) -> Result<User, Error> {
        let display_name = sanitize_text("displayName", &request.display_name, DISPLAY_NAME_MAX)
            .map_err(|err| map_sanitize_error("displayName", &err))?;
        let email = EmailAddress::new(&request.email)
            .map_err(|err| map_sanitize_error("email", &err))?;
        let phone = request
            .phone
            .as_deref()
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|err| map_sanitize_error("phone", &err))?;

        if request.password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must be at least {PASSWORD_MIN} characters"
            ))
            .with_details(json!({ "field": "password", "code": "too_short" })));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = self
            .users
            .create(
                &NewUser {
                    display_name,
                    email,
                    phone,
                    password_hash,
                    role: UserRole::Supporter,
                },
                self.clock.utc(),
            )
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<User, Error> {
        // A malformed email can never match an account; fail like a wrong
        // password instead of leaking the validation distinction.
        let Ok(email) = EmailAddress::new(&request.email) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        let matches = verify_password(&request.password, &user.password_hash)
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(user)
    }
}
