//! URL-safe slug identifier shared by causes and events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum allowed length for a slug.
pub const SLUG_MAX: usize = 96;

/// Validation errors returned by [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    /// The slug is empty after trimming.
    #[error("slug must not be empty")]
    Empty,
    /// The slug exceeds [`SLUG_MAX`] characters.
    #[error("slug must be at most {SLUG_MAX} characters")]
    TooLong,
    /// The slug contains characters outside `a-z`, `0-9`, and `-`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacters,
}

/// URL-safe identifier for public content pages.
///
/// ## Invariants
/// - lowercase ASCII letters, digits, and interior hyphens only
/// - never empty, never longer than [`SLUG_MAX`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`].
    pub fn new(raw: impl Into<String>) -> Result<Self, SlugValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if raw.chars().count() > SLUG_MAX {
            return Err(SlugValidationError::TooLong);
        }
        let valid_shape = raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_shape || raw.starts_with('-') || raw.ends_with('-') {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("clean-water")]
    #[case("winter-relief-2026")]
    #[case("a")]
    fn accepts_well_formed_slugs(#[case] raw: &str) {
        let slug = Slug::new(raw).expect("slug should validate");
        assert_eq!(slug.as_ref(), raw);
    }

    #[rstest]
    #[case("", SlugValidationError::Empty)]
    #[case("Clean-Water", SlugValidationError::InvalidCharacters)]
    #[case("clean water", SlugValidationError::InvalidCharacters)]
    #[case("-leading", SlugValidationError::InvalidCharacters)]
    #[case("trailing-", SlugValidationError::InvalidCharacters)]
    fn rejects_malformed_slugs(#[case] raw: &str, #[case] expected: SlugValidationError) {
        assert_eq!(Slug::new(raw).expect_err("slug must fail"), expected);
    }

    #[rstest]
    fn rejects_overlong_slug() {
        let raw = "a".repeat(SLUG_MAX + 1);
        assert_eq!(
            Slug::new(raw).expect_err("slug must fail"),
            SlugValidationError::TooLong
        );
    }
}
