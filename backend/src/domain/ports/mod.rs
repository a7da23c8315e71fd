//! Domain ports: the traits the domain is driven by and drives.
//!
//! Driving ports ([`DonationCommand`], [`AuthCommand`]) are called by inbound
//! adapters; driven ports (repositories, the payment gateway, the rate-limit
//! store) are implemented by outbound adapters. In-memory implementations
//! live beside each port so the server runs without a database pool and
//! handler tests stay deterministic.

mod macros;

pub mod auth_command;
pub mod cause_repository;
pub mod donation_command;
pub mod donation_repository;
pub mod event_repository;
pub mod message_repository;
pub mod newsletter_repository;
pub mod payment_gateway;
pub mod rate_limit_store;
pub mod user_repository;

pub(crate) use macros::define_port_error;

pub use auth_command::{AuthCommand, LoginRequest, SignupRequest};
pub use cause_repository::{CausePersistenceError, CauseRepository, InMemoryCauseDirectory};
pub use donation_command::{
    CreateDonationRequest, CreateDonationResponse, DonationCommand, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
pub use donation_repository::{
    CauseTotals, DonationPersistenceError, DonationRepository, InMemoryDonationStore,
    SettleDonation, SettleOutcome,
};
pub use event_repository::{EventPersistenceError, EventRepository, InMemoryEventCalendar};
pub use message_repository::{InMemoryInbox, MessagePersistenceError, MessageRepository};
pub use newsletter_repository::{
    InMemorySubscriberList, NewsletterPersistenceError, NewsletterRepository,
};
pub use payment_gateway::{
    GatewayOrder, GatewayOrderRequest, GatewayPayment, GatewayPaymentStatus, PaymentGateway,
    PaymentGatewayError, StubPaymentGateway, signature_payload, verify_hmac_signature,
};
pub use rate_limit_store::{InMemoryRateLimitStore, RateLimitStore, WindowSnapshot};
pub use user_repository::{InMemoryUserStore, UserPersistenceError, UserRepository};
