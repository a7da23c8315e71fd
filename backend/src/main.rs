//! Backend entry-point: wires configuration, state, and the HTTP server.

mod server;

use actix_web::cookie::SameSite;
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use server::config::secret_fingerprint;
use server::{AppConfig, ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env()?;
    info!(
        session_key_fingerprint = %secret_fingerprint(config.session_key.signing()),
        csrf_secret_fingerprint = %secret_fingerprint(&config.csrf_secret),
        database = config.database_url.is_some(),
        gateway = config.gateway.is_some(),
        public_base_url = config.public_base_url.as_deref().unwrap_or("-"),
        "configuration loaded"
    );

    let http_state = build_http_state(&config).await?;
    let health_state = web::Data::new(HealthState::new());

    let server = create_server(
        health_state,
        http_state,
        ServerConfig {
            key: config.session_key.clone(),
            cookie_secure: config.cookie_secure,
            same_site: SameSite::Lax,
            bind_addr: config.bind_addr,
        },
    )?;

    info!(addr = %config.bind_addr, "listening");
    server.await
}
