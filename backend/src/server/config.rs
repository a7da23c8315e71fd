//! Environment-driven application configuration.
//!
//! All settings are read once at startup. Missing required values are fatal
//! in release builds; debug builds warn and fall back to ephemeral dev
//! values so a bare `cargo run` serves something usable.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;
use zeroize::Zeroize;

use backend::outbound::payment::GatewayCredentials;

/// Length of the logged secret fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Payment gateway connection settings.
pub struct GatewaySettings {
    /// Base URL of the gateway REST API.
    pub base_url: Url,
    /// Account credentials and webhook secret.
    pub credentials: GatewayCredentials,
}

/// Application configuration assembled from the environment.
pub struct AppConfig {
    /// PostgreSQL connection string; absent means in-memory stores.
    pub database_url: Option<String>,
    /// Session cookie signing key.
    pub session_key: Key,
    /// Whether session cookies require HTTPS.
    pub cookie_secure: bool,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Secret the CSRF token service signs with.
    pub csrf_secret: Vec<u8>,
    /// Gateway settings; absent means the stub gateway.
    pub gateway: Option<GatewaySettings>,
    /// Public site URL, used in startup logs and receipts.
    pub public_base_url: Option<String>,
}

/// Truncated SHA-256 fingerprint of secret material, safe to log.
#[must_use]
pub fn secret_fingerprint(material: &[u8]) -> String {
    let digest = Sha256::digest(material);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

fn fatal(message: String) -> std::io::Error {
    std::io::Error::other(message)
}

/// Read an env var that is required in release builds.
///
/// Returns `None` (after warning) in debug builds so local development can
/// proceed with fallbacks.
fn required_in_release(name: &str) -> Result<Option<String>, std::io::Error> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        _ if cfg!(debug_assertions) => {
            warn!(variable = name, "missing configuration; using dev fallback");
            Ok(None)
        }
        _ => Err(fatal(format!("{name} must be set"))),
    }
}

fn load_session_key() -> Result<Key, std::io::Error> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(mut bytes) => {
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(err) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(fatal(format!(
                    "failed to read session key at {key_path}: {err}"
                )))
            }
        }
    }
}

fn load_gateway() -> Result<Option<GatewaySettings>, std::io::Error> {
    let base_url = required_in_release("PAYMENT_GATEWAY_BASE_URL")?;
    let key_id = required_in_release("PAYMENT_GATEWAY_KEY_ID")?;
    let key_secret = required_in_release("PAYMENT_GATEWAY_KEY_SECRET")?;
    let webhook_secret = required_in_release("PAYMENT_WEBHOOK_SECRET")?;

    let (Some(base_url), Some(key_id), Some(key_secret), Some(webhook_secret)) =
        (base_url, key_id, key_secret, webhook_secret)
    else {
        return Ok(None);
    };

    let base_url = Url::parse(&base_url)
        .map_err(|err| fatal(format!("PAYMENT_GATEWAY_BASE_URL is not a URL: {err}")))?;
    Ok(Some(GatewaySettings {
        base_url,
        credentials: GatewayCredentials {
            key_id,
            key_secret,
            webhook_secret,
        },
    }))
}

impl AppConfig {
    /// Assemble the configuration, failing fast on fatal gaps.
    ///
    /// # Errors
    /// Returns an error when a required value is missing in a release build
    /// or a present value cannot be parsed.
    pub fn from_env() -> Result<Self, std::io::Error> {
        let database_url = required_in_release("DATABASE_URL")?;
        let session_key = load_session_key()?;

        let csrf_secret = match required_in_release("CSRF_SECRET")? {
            Some(secret) => secret.into_bytes(),
            // Dev fallback: derive from the (possibly ephemeral) session key
            // so the two secrets never accidentally coincide with a fixture.
            None => session_key.signing().to_vec(),
        };

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v != "0")
            .unwrap_or(true);

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse()
            .map_err(|err| fatal(format!("BIND_ADDR is not a socket address: {err}")))?;

        let gateway = load_gateway()?;
        let public_base_url = env::var("PUBLIC_BASE_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            session_key,
            cookie_secure,
            bind_addr,
            csrf_secret,
            gateway,
            public_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_short_stable_hex() {
        let first = secret_fingerprint(b"some secret");
        let second = secret_fingerprint(b"some secret");
        assert_eq!(first, second);
        assert_eq!(first.len(), FINGERPRINT_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn fingerprints_differ_between_secrets() {
        assert_ne!(secret_fingerprint(b"one"), secret_fingerprint(b"two"));
    }

    #[cfg(debug_assertions)]
    #[rstest]
    fn from_env_uses_fallbacks_in_debug_builds() {
        let _guard = env_lock::lock_env([
            ("DATABASE_URL", None::<&str>),
            ("SESSION_KEY_FILE", Some("/nonexistent/session_key")),
            ("CSRF_SECRET", None),
            ("PAYMENT_GATEWAY_BASE_URL", None),
            ("PAYMENT_GATEWAY_KEY_ID", None),
            ("PAYMENT_GATEWAY_KEY_SECRET", None),
            ("PAYMENT_WEBHOOK_SECRET", None),
            ("SESSION_COOKIE_SECURE", Some("0")),
            ("BIND_ADDR", Some("127.0.0.1:9090")),
            ("PUBLIC_BASE_URL", None),
        ]);

        let config = AppConfig::from_env().expect("debug builds fall back");
        assert!(config.database_url.is_none());
        assert!(config.gateway.is_none());
        assert!(!config.cookie_secure);
        assert_eq!(config.bind_addr.port(), 9090);
        assert!(!config.csrf_secret.is_empty());
    }

    #[rstest]
    fn from_env_rejects_malformed_bind_addr() {
        let _guard = env_lock::lock_env([
            ("BIND_ADDR", Some("not-an-addr")),
            ("SESSION_KEY_FILE", Some("/nonexistent/session_key")),
            ("DATABASE_URL", None),
            ("CSRF_SECRET", None),
            ("PAYMENT_GATEWAY_BASE_URL", None),
            ("PAYMENT_GATEWAY_KEY_ID", None),
            ("PAYMENT_GATEWAY_KEY_SECRET", None),
            ("PAYMENT_WEBHOOK_SECRET", None),
        ]);

        assert!(AppConfig::from_env().is_err());
    }
}
