//! Driving port for signup and login use-cases.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::user::User;

/// Signup form fields, raw from the request.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Name shown on receipts and greetings.
    pub display_name: String,
    /// Contact email, normalised during signup.
    pub email: String,
    /// Optional contact phone, normalised during signup.
    pub phone: Option<String>,
    /// Plaintext password; hashed before it reaches persistence.
    pub password: String,
}

/// Login form fields, raw from the request.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Contact email the account was registered with.
    pub email: String,
    /// Plaintext password to verify against the stored hash.
    pub password: String,
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Create an account; duplicate email or phone is a conflict.
    async fn signup(&self, request: SignupRequest) -> Result<User, Error>;

    /// Validate credentials and return the authenticated account.
    async fn login(&self, request: LoginRequest) -> Result<User, Error>;
}
