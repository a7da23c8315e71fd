//! Shared Diesel error classification for repository adapters.
//!
//! Repositories translate classified failures into their own port error
//! enums; the classification itself (and the logging of full detail) lives
//! here so no adapter leaks driver messages to clients.

use tracing::debug;

use super::pool::PoolError;

/// Coarse failure category derived from a Diesel error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DieselFailure {
    /// A unique constraint was violated; carries the constraint name when
    /// the driver reported one.
    UniqueViolation(Option<String>),
    /// The connection was lost mid-operation.
    Connection(&'static str),
    /// Any other query failure.
    Query(&'static str),
}

/// Extract the message from a pool error for connection-variant mapping.
pub(super) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the full driver detail at debug level.
pub(super) fn classify_diesel_error(error: diesel::result::Error) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(ToOwned::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        _ => DieselFailure::Query("database error"),
    }
}
