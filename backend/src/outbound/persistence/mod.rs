//! Diesel-backed persistence adapters over a shared async pool.

mod diesel_cause_repository;
mod diesel_donation_repository;
mod diesel_error_classification;
mod diesel_event_repository;
mod diesel_message_repository;
mod diesel_newsletter_repository;
mod diesel_user_repository;
mod models;
mod schema;

pub mod pool;

pub use diesel_cause_repository::DieselCauseRepository;
pub use diesel_donation_repository::DieselDonationRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_newsletter_repository::DieselNewsletterRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
