//! User account model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::sanitize::{SanitizeError, sanitize_email, sanitize_phone};

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Normalised, validated email address.
///
/// Construction runs [`sanitize_email`], so two addresses differing only in
/// case or padding compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: &str) -> Result<Self, SanitizeError> {
        sanitize_email(raw).map(Self)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = SanitizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Normalised, validated phone number in E.164 shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`].
    pub fn new(raw: &str) -> Result<Self, SanitizeError> {
        sanitize_phone(raw).map(Self)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = SanitizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Access level attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Default role for signed-up donors and volunteers.
    Supporter,
    /// Staff role with content management access.
    Admin,
}

impl UserRole {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supporter => "supporter",
            Self::Admin => "admin",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "supporter" => Some(Self::Supporter),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A registered account.
///
/// ## Invariants
/// - `email` is unique across accounts; `phone`, when present, likewise.
/// - `password_hash` is always an argon2 PHC string; accounts are created at
///   signup and never deleted in-flow.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable account identifier.
    pub id: Uuid,
    /// Name shown on receipts and greetings.
    pub display_name: String,
    /// Unique contact email.
    pub email: EmailAddress,
    /// Optional unique contact phone.
    pub phone: Option<PhoneNumber>,
    /// Argon2 PHC-format password hash. Never serialised outward.
    pub password_hash: String,
    /// Access level.
    pub role: UserRole,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Whether the phone number has been verified.
    pub phone_verified: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Name shown on receipts and greetings.
    pub display_name: String,
    /// Unique contact email.
    pub email: EmailAddress,
    /// Optional unique contact phone.
    pub phone: Option<PhoneNumber>,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Access level; signup always grants [`UserRole::Supporter`].
    pub role: UserRole,
}
