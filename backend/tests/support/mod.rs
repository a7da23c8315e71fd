//! Shared fixtures for integration tests: an app over in-memory ports.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::web;
use mockable::DefaultClock;

use backend::domain::ports::{
    InMemoryCauseDirectory, InMemoryDonationStore, InMemoryEventCalendar, InMemoryInbox,
    InMemoryRateLimitStore, InMemorySubscriberList, InMemoryUserStore, StubPaymentGateway,
};
use backend::domain::{AuthCommandService, CsrfTokenService, DonationCommandService, RateLimiter};
use backend::inbound::http::state::{HttpState, HttpStatePorts};

/// Webhook secret shared by the stub gateway and the tests that sign
/// callbacks.
pub const WEBHOOK_SECRET: &[u8] = b"whsec_integration";

/// Handles onto the in-memory ports behind the assembled state.
pub struct World {
    /// The handler state to mount in a test app.
    pub state: web::Data<HttpState>,
    /// Stub gateway for signing callbacks and steering payment status.
    pub gateway: Arc<StubPaymentGateway>,
    /// Donation ledger for asserting settle effects.
    pub donations: Arc<InMemoryDonationStore>,
    /// Cause directory seeded with one active cause (`clean-water`).
    pub causes: Arc<InMemoryCauseDirectory>,
    /// Subscriber list behind the newsletter endpoint.
    pub newsletter: Arc<InMemorySubscriberList>,
    /// Inbox behind the form endpoints.
    pub inbox: Arc<InMemoryInbox>,
    /// User store behind signup and login.
    pub users: Arc<InMemoryUserStore>,
    /// Identifier of the seeded cause.
    pub seeded_cause_id: uuid::Uuid,
}

/// Assemble a fresh world over in-memory ports.
#[must_use]
pub fn world() -> World {
    let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
    let gateway = Arc::new(StubPaymentGateway::new(WEBHOOK_SECRET.to_vec()));
    let donations = Arc::new(InMemoryDonationStore::new());
    let seeded_cause = InMemoryCauseDirectory::sample_cause("clean-water");
    let seeded_cause_id = seeded_cause.id;
    let causes = Arc::new(InMemoryCauseDirectory::with_causes(vec![seeded_cause]));
    let events = Arc::new(InMemoryEventCalendar::new());
    let newsletter = Arc::new(InMemorySubscriberList::new());
    let inbox = Arc::new(InMemoryInbox::new());
    let users = Arc::new(InMemoryUserStore::new());

    let state = web::Data::new(HttpState::new(
        HttpStatePorts {
            donations: Arc::new(DonationCommandService::new(
                gateway.clone(),
                donations.clone(),
                causes.clone(),
                clock.clone(),
            )),
            auth: Arc::new(AuthCommandService::new(users.clone(), clock.clone())),
            users: users.clone(),
            causes: causes.clone(),
            events,
            newsletter: newsletter.clone(),
            messages: inbox.clone(),
        },
        Arc::new(RateLimiter::new(
            Arc::new(InMemoryRateLimitStore::new()),
            clock.clone(),
        )),
        Arc::new(CsrfTokenService::new(b"csrf_integration".to_vec(), clock.clone())),
        clock,
    ));

    World {
        state,
        gateway,
        donations,
        causes,
        newsletter,
        inbox,
        users,
        seeded_cause_id,
    }
}

/// Cookie session middleware with an ephemeral key.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}
