//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend
//! only on domain ports and stay testable without I/O. The in-memory port
//! implementations make a pool-less server (and handler tests) fully
//! functional.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::CsrfTokenService;
use crate::domain::RateLimiter;
use crate::domain::ports::{
    AuthCommand, CauseRepository, DonationCommand, EventRepository, MessageRepository,
    NewsletterRepository, UserRepository,
};

/// Parameter object bundling every port implementation for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Donation intake and payment verification use-cases.
    pub donations: Arc<dyn DonationCommand>,
    /// Signup and login use-cases.
    pub auth: Arc<dyn AuthCommand>,
    /// Account lookup for the session-bound profile endpoint.
    pub users: Arc<dyn UserRepository>,
    /// Cause reads.
    pub causes: Arc<dyn CauseRepository>,
    /// Event reads.
    pub events: Arc<dyn EventRepository>,
    /// Newsletter subscription writes.
    pub newsletter: Arc<dyn NewsletterRepository>,
    /// Form submission writes.
    pub messages: Arc<dyn MessageRepository>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Donation intake and payment verification use-cases.
    pub donations: Arc<dyn DonationCommand>,
    /// Signup and login use-cases.
    pub auth: Arc<dyn AuthCommand>,
    /// Account lookup for the session-bound profile endpoint.
    pub users: Arc<dyn UserRepository>,
    /// Cause reads.
    pub causes: Arc<dyn CauseRepository>,
    /// Event reads.
    pub events: Arc<dyn EventRepository>,
    /// Newsletter subscription writes.
    pub newsletter: Arc<dyn NewsletterRepository>,
    /// Form submission writes.
    pub messages: Arc<dyn MessageRepository>,
    /// Shared limiter for throttled endpoints.
    pub rate_limiter: Arc<RateLimiter>,
    /// Stateless CSRF token service.
    pub csrf: Arc<CsrfTokenService>,
    /// Clock handlers read request time from.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from a ports bundle plus the cross-cutting services.
    pub fn new(
        ports: HttpStatePorts,
        rate_limiter: Arc<RateLimiter>,
        csrf: Arc<CsrfTokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let HttpStatePorts {
            donations,
            auth,
            users,
            causes,
            events,
            newsletter,
            messages,
        } = ports;
        Self {
            donations,
            auth,
            users,
            causes,
            events,
            newsletter,
            messages,
            rate_limiter,
            csrf,
            clock,
        }
    }
}
