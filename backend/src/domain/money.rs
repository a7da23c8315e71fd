//! Monetary values in minor currency units.
//!
//! Amounts are carried as `i64` minor units (cents, paise) end to end, the
//! same representation the donations and causes tables use, so aggregate
//! arithmetic never touches floating point.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest accepted single-donation amount, in minor units.
pub const AMOUNT_MAX_MINOR: i64 = 1_000_000_000;

/// Validation errors returned by [`Amount::from_minor`] and
/// [`CurrencyCode::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyValidationError {
    /// The amount is zero or negative.
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// The amount exceeds [`AMOUNT_MAX_MINOR`].
    #[error("amount must be at most {AMOUNT_MAX_MINOR} minor units")]
    AmountTooLarge,
    /// The currency code is not three ASCII uppercase letters.
    #[error("currency must be a three-letter ISO 4217 code")]
    InvalidCurrency,
}

/// A positive monetary amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Validate and construct an [`Amount`] from minor units.
    pub const fn from_minor(minor: i64) -> Result<Self, MoneyValidationError> {
        if minor <= 0 {
            return Err(MoneyValidationError::NonPositiveAmount);
        }
        if minor > AMOUNT_MAX_MINOR {
            return Err(MoneyValidationError::AmountTooLarge);
        }
        Ok(Self(minor))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = MoneyValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_minor(value)
    }
}

/// ISO 4217 alphabetic currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Validate and construct a [`CurrencyCode`]; input is uppercased.
    pub fn new(raw: impl Into<String>) -> Result<Self, MoneyValidationError> {
        let raw = raw.into().trim().to_ascii_uppercase();
        if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(MoneyValidationError::InvalidCurrency);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, MoneyValidationError::NonPositiveAmount)]
    #[case(-500, MoneyValidationError::NonPositiveAmount)]
    #[case(AMOUNT_MAX_MINOR + 1, MoneyValidationError::AmountTooLarge)]
    fn rejects_out_of_range_amounts(#[case] minor: i64, #[case] expected: MoneyValidationError) {
        assert_eq!(
            Amount::from_minor(minor).expect_err("amount must fail"),
            expected
        );
    }

    #[rstest]
    fn accepts_positive_amount() {
        let amount = Amount::from_minor(2_500).expect("amount validates");
        assert_eq!(amount.minor(), 2_500);
    }

    #[rstest]
    #[case("inr", "INR")]
    #[case(" USD ", "USD")]
    fn currency_codes_normalise_to_uppercase(#[case] raw: &str, #[case] expected: &str) {
        let code = CurrencyCode::new(raw).expect("currency validates");
        assert_eq!(code.as_ref(), expected);
    }

    #[rstest]
    #[case("RUPEES")]
    #[case("us")]
    #[case("U$D")]
    fn rejects_malformed_currency_codes(#[case] raw: &str) {
        assert_eq!(
            CurrencyCode::new(raw).expect_err("currency must fail"),
            MoneyValidationError::InvalidCurrency
        );
    }
}
