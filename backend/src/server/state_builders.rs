//! Builders selecting database-backed or in-memory port implementations.
//!
//! A configured `DATABASE_URL` selects the Diesel adapters; otherwise every
//! port falls back to its in-memory implementation so a bare dev server
//! still serves the full API. The payment gateway likewise falls back to
//! the stub when credentials are absent.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use backend::domain::ports::{
    CauseRepository, DonationRepository, EventRepository, InMemoryCauseDirectory,
    InMemoryDonationStore, InMemoryEventCalendar, InMemoryInbox, InMemoryRateLimitStore,
    InMemorySubscriberList, InMemoryUserStore, MessageRepository, NewsletterRepository,
    PaymentGateway, StubPaymentGateway, UserRepository,
};
use backend::domain::{
    AuthCommandService, CsrfTokenService, DonationCommandService, RateLimiter,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::payment::HttpPaymentGateway;
use backend::outbound::persistence::{
    DbPool, DieselCauseRepository, DieselDonationRepository, DieselEventRepository,
    DieselMessageRepository, DieselNewsletterRepository, DieselUserRepository, PoolConfig,
};

use super::config::AppConfig;

/// Webhook secret the stub gateway signs with when none is configured.
const DEV_WEBHOOK_SECRET: &[u8] = b"dev-webhook-secret";

fn build_gateway(config: &AppConfig) -> std::io::Result<Arc<dyn PaymentGateway>> {
    match &config.gateway {
        Some(settings) => {
            let gateway =
                HttpPaymentGateway::new(settings.base_url.clone(), &settings.credentials)
                    .map_err(|err| {
                        std::io::Error::other(format!("payment gateway client failed: {err}"))
                    })?;
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("payment gateway credentials absent; using stub gateway (dev only)");
            Ok(Arc::new(StubPaymentGateway::new(DEV_WEBHOOK_SECRET.to_vec())))
        }
    }
}

async fn build_pool(database_url: &str) -> std::io::Result<DbPool> {
    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool failed: {err}")))
}

struct RepositoryBundle {
    donations: Arc<dyn DonationRepository>,
    causes: Arc<dyn CauseRepository>,
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    newsletter: Arc<dyn NewsletterRepository>,
    messages: Arc<dyn MessageRepository>,
}

fn diesel_repositories(pool: &DbPool) -> RepositoryBundle {
    RepositoryBundle {
        donations: Arc::new(DieselDonationRepository::new(pool.clone())),
        causes: Arc::new(DieselCauseRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        newsletter: Arc::new(DieselNewsletterRepository::new(pool.clone())),
        messages: Arc::new(DieselMessageRepository::new(pool.clone())),
    }
}

fn in_memory_repositories() -> RepositoryBundle {
    warn!("DATABASE_URL absent; serving from in-memory stores (dev only)");
    RepositoryBundle {
        donations: Arc::new(InMemoryDonationStore::new()),
        causes: Arc::new(InMemoryCauseDirectory::with_causes(vec![
            InMemoryCauseDirectory::sample_cause("clean-water"),
        ])),
        users: Arc::new(InMemoryUserStore::new()),
        events: Arc::new(InMemoryEventCalendar::new()),
        newsletter: Arc::new(InMemorySubscriberList::new()),
        messages: Arc::new(InMemoryInbox::new()),
    }
}

/// Build the shared HTTP state from configuration.
///
/// # Errors
/// Fails when the database pool or gateway client cannot be constructed.
pub async fn build_http_state(config: &AppConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let gateway = build_gateway(config)?;

    let repositories = match &config.database_url {
        Some(url) => diesel_repositories(&build_pool(url).await?),
        None => in_memory_repositories(),
    };

    let donations_command = Arc::new(DonationCommandService::new(
        gateway,
        repositories.donations,
        repositories.causes.clone(),
        clock.clone(),
    ));
    let auth_command = Arc::new(AuthCommandService::new(
        repositories.users.clone(),
        clock.clone(),
    ));
    let rate_limiter = Arc::new(RateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        clock.clone(),
    ));
    let csrf = Arc::new(CsrfTokenService::new(
        config.csrf_secret.clone(),
        clock.clone(),
    ));

    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            donations: donations_command,
            auth: auth_command,
            users: repositories.users,
            causes: repositories.causes,
            events: repositories.events,
            newsletter: repositories.newsletter,
            messages: repositories.messages,
        },
        rate_limiter,
        csrf,
        clock,
    )))
}
