//! Diesel-backed [`UserRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{EmailAddress, NewUser, User};

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map an insert failure, turning unique violations into the uniqueness
/// variants the domain distinguishes on.
fn map_insert_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::UniqueViolation(constraint) => {
            match constraint.as_deref() {
                Some(name) if name.contains("phone") => UserPersistenceError::DuplicatePhone,
                Some(name) if name.contains("email") => UserPersistenceError::DuplicateEmail,
                other => {
                    // An unnamed or unrecognised constraint still means a
                    // duplicate; email is the overwhelmingly common case.
                    warn!(constraint = ?other, "unrecognised unique violation on users");
                    UserPersistenceError::DuplicateEmail
                }
            }
        }
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_read_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) | DieselFailure::Query(_) => {
            UserPersistenceError::query("database error")
        }
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        user: &NewUser,
        created_at: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| UserPersistenceError::connection(pool_error_message(err)))?;

        let row = NewUserRow {
            id: Uuid::new_v4(),
            display_name: &user.display_name,
            email: user.email.as_ref(),
            phone: user.phone.as_ref().map(AsRef::as_ref),
            password_hash: &user.password_hash,
            role: user.role.as_str(),
            email_verified: false,
            phone_verified: false,
            created_at,
            updated_at: created_at,
        };

        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        row_to_user(stored)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| UserPersistenceError::connection(pool_error_message(err)))?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| UserPersistenceError::connection(pool_error_message(err)))?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;

        row.map(row_to_user).transpose()
    }
}
