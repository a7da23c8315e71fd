//! Domain layer: entities, value types, ports, and services.
//!
//! Types here are transport and persistence agnostic. Inbound adapters map
//! them to HTTP; outbound adapters implement the driven ports in
//! [`ports`]. Invariants live on the types themselves via fallible
//! constructors, so adapters cannot hand the domain malformed values.

pub mod auth;
pub mod cause;
pub mod csrf;
pub mod donation;
pub mod error;
pub mod event;
pub mod mac;
pub mod message;
pub mod money;
pub mod password;
pub mod payments;
pub mod ports;
pub mod rate_limit;
pub mod sanitize;
pub mod slug;
pub mod user;

pub use self::auth::AuthCommandService;
pub use self::cause::{Cause, CauseStatus};
pub use self::csrf::CsrfTokenService;
pub use self::donation::{Donation, DonationStatus, NewDonation, ReceiptNo};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::event::{Event, EventFilter, EventStatus};
pub use self::message::{Message, MessageKind, NewMessage};
pub use self::money::{Amount, CurrencyCode};
pub use self::payments::DonationCommandService;
pub use self::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};
pub use self::slug::Slug;
pub use self::user::{EmailAddress, NewUser, PhoneNumber, User, UserRole};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
