//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::web;
use mockable::DefaultClock;

use crate::domain::ports::{
    InMemoryCauseDirectory, InMemoryDonationStore, InMemoryEventCalendar, InMemoryInbox,
    InMemoryRateLimitStore, InMemorySubscriberList, InMemoryUserStore, StubPaymentGateway,
};
use crate::domain::{AuthCommandService, CsrfTokenService, DonationCommandService, RateLimiter};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Webhook secret shared by the stub gateway and test callers.
pub const TEST_WEBHOOK_SECRET: &[u8] = b"whsec_test";

/// CSRF secret used by the test state.
pub const TEST_CSRF_SECRET: &[u8] = b"csrf_test_secret";

/// Cookie session middleware with an ephemeral key, for handler tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Handles onto the in-memory ports behind a [`test_state`] bundle.
pub struct TestStateHandles {
    /// The assembled handler state.
    pub state: web::Data<HttpState>,
    /// The stub gateway, for signing callbacks and steering payment status.
    pub gateway: Arc<StubPaymentGateway>,
    /// The donation store, for asserting on ledger state.
    pub donations: Arc<InMemoryDonationStore>,
    /// The cause directory backing cause reads.
    pub causes: Arc<InMemoryCauseDirectory>,
    /// The event calendar backing event reads.
    pub events: Arc<InMemoryEventCalendar>,
    /// The subscriber list backing newsletter writes.
    pub newsletter: Arc<InMemorySubscriberList>,
    /// The inbox backing form writes.
    pub inbox: Arc<InMemoryInbox>,
    /// The user store backing signup and login.
    pub users: Arc<InMemoryUserStore>,
}

/// Assemble an [`HttpState`] over fresh in-memory ports.
#[must_use]
pub fn test_state() -> TestStateHandles {
    let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
    let gateway = Arc::new(StubPaymentGateway::new(TEST_WEBHOOK_SECRET.to_vec()));
    let donations = Arc::new(InMemoryDonationStore::new());
    let causes = Arc::new(InMemoryCauseDirectory::with_causes(vec![
        InMemoryCauseDirectory::sample_cause("clean-water"),
    ]));
    let events = Arc::new(InMemoryEventCalendar::new());
    let newsletter = Arc::new(InMemorySubscriberList::new());
    let inbox = Arc::new(InMemoryInbox::new());
    let users = Arc::new(InMemoryUserStore::new());

    let donation_service = Arc::new(DonationCommandService::new(
        gateway.clone(),
        donations.clone(),
        causes.clone(),
        clock.clone(),
    ));
    let auth_service = Arc::new(AuthCommandService::new(users.clone(), clock.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        clock.clone(),
    ));
    let csrf = Arc::new(CsrfTokenService::new(
        TEST_CSRF_SECRET.to_vec(),
        clock.clone(),
    ));

    let state = web::Data::new(HttpState::new(
        HttpStatePorts {
            donations: donation_service,
            auth: auth_service,
            users: users.clone(),
            causes: causes.clone(),
            events: events.clone(),
            newsletter: newsletter.clone(),
            messages: inbox.clone(),
        },
        rate_limiter,
        csrf,
        clock,
    ));

    TestStateHandles {
        state,
        gateway,
        donations,
        causes,
        events,
        newsletter,
        inbox,
        users,
    }
}
