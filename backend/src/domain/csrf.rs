//! Self-contained CSRF tokens.
//!
//! A token embeds a random nonce, its issuance timestamp, and an
//! HMAC-SHA256 of both under a server-held secret. Validity is entirely
//! self-contained: no server-side storage, trading revocability for
//! statelessness. Rendering: `"{nonce_hex}.{issued_at_ms}.{mac_hex}"`.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::mac::{constant_time_eq, hmac_sha256};

/// Bytes of randomness in a token nonce.
const NONCE_BYTES: usize = 16;

/// Stateless CSRF token generator and validator.
pub struct CsrfTokenService {
    secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl CsrfTokenService {
    /// Create a service signing with `secret` and reading time from `clock`.
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    fn mac_hex(&self, nonce_hex: &str, issued_at_ms: i64) -> String {
        let material = format!("{nonce_hex}:{issued_at_ms}");
        hex::encode(hmac_sha256(&self.secret, material.as_bytes()))
    }

    /// Generate a fresh token bound to the current time.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut nonce = [0_u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce);
        let nonce_hex = hex::encode(nonce);
        let issued_at_ms = self.clock.utc().timestamp_millis();
        let mac = self.mac_hex(&nonce_hex, issued_at_ms);
        format!("{nonce_hex}.{issued_at_ms}.{mac}")
    }

    /// Check a token's MAC and age.
    ///
    /// Rejects tokens whose MAC does not recompute, whose timestamp lies in
    /// the future, or whose age exceeds `max_age`.
    #[must_use]
    pub fn validate(&self, token: &str, max_age: Duration) -> bool {
        let mut parts = token.splitn(3, '.');
        let (Some(nonce_hex), Some(issued_raw), Some(mac_hex)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let Ok(issued_at_ms) = issued_raw.parse::<i64>() else {
            return false;
        };

        let expected = self.mac_hex(nonce_hex, issued_at_ms);
        if !constant_time_eq(expected.as_bytes(), mac_hex.as_bytes()) {
            return false;
        }

        let elapsed_ms = self.clock.utc().timestamp_millis() - issued_at_ms;
        elapsed_ms >= 0 && elapsed_ms <= max_age.num_milliseconds()
    }
}
