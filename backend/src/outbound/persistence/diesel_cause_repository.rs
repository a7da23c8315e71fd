//! Diesel-backed [`CauseRepository`] adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::cause::{Cause, CauseStatus};
use crate::domain::ports::{CausePersistenceError, CauseRepository};
use crate::domain::slug::Slug;

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::CauseRow;
use super::pool::DbPool;
use super::schema::causes;

/// Diesel-backed cause repository.
#[derive(Clone)]
pub struct DieselCauseRepository {
    pool: DbPool,
}

impl DieselCauseRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CausePersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => CausePersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) | DieselFailure::Query(_) => {
            CausePersistenceError::query("database error")
        }
    }
}

#[async_trait]
impl CauseRepository for DieselCauseRepository {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Cause>, CausePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CausePersistenceError::connection(pool_error_message(err)))?;

        let row: Option<CauseRow> = causes::table
            .filter(causes::slug.eq(slug.as_ref()))
            .select(CauseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Cause::try_from)
            .transpose()
            .map_err(CausePersistenceError::query)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Cause>, CausePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CausePersistenceError::connection(pool_error_message(err)))?;

        let hidden = [CauseStatus::Draft.as_str(), CauseStatus::Archived.as_str()];

        let total: i64 = causes::table
            .filter(causes::status.ne_all(hidden))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<CauseRow> = causes::table
            .filter(causes::status.ne_all(hidden))
            // Active campaigns first, then newest.
            .order((
                causes::status.eq(CauseStatus::Active.as_str()).desc(),
                causes::created_at.desc(),
            ))
            .limit(i64::from(page.limit()))
            .offset(i64::from(page.offset()))
            .select(CauseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Cause::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CausePersistenceError::query)?;

        Ok(Page::new(page, items, total.unsigned_abs()))
    }
}
