//! Diesel-backed [`EventRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;

use crate::domain::event::{Event, EventFilter};
use crate::domain::ports::{EventPersistenceError, EventRepository};
use crate::domain::slug::Slug;

use super::diesel_error_classification::{
    DieselFailure, classify_diesel_error, pool_error_message,
};
use super::models::EventRow;
use super::pool::DbPool;
use super::schema::events;

/// Diesel-backed event repository.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> EventPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => EventPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) | DieselFailure::Query(_) => {
            EventPersistenceError::query("database error")
        }
    }
}

/// Apply the filter to a fresh boxed query. Built twice per list call
/// because a boxed query cannot be both counted and loaded.
fn filtered_query<'a>(
    filter: &'a EventFilter,
    now: DateTime<Utc>,
) -> events::BoxedQuery<'a, diesel::pg::Pg> {
    let mut query = events::table.into_boxed();
    if let Some(category) = &filter.category {
        query = query.filter(events::category.eq(category));
    }
    if let Some(status) = filter.status {
        query = query.filter(events::status.eq(status.as_str()));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query = query.filter(
            events::title
                .ilike(pattern.clone())
                .or(events::description.ilike(pattern)),
        );
    }
    if filter.upcoming_only {
        query = query.filter(events::starts_at.gt(now));
    }
    query
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Event>, EventPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| EventPersistenceError::connection(pool_error_message(err)))?;

        let row: Option<EventRow> = events::table
            .filter(events::slug.eq(slug.as_ref()))
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Event::try_from)
            .transpose()
            .map_err(EventPersistenceError::query)
    }

    async fn list(
        &self,
        filter: &EventFilter,
        now: DateTime<Utc>,
    ) -> Result<Page<Event>, EventPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| EventPersistenceError::connection(pool_error_message(err)))?;

        let total: i64 = filtered_query(filter, now)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<EventRow> = filtered_query(filter, now)
            .order(events::starts_at.asc())
            .limit(i64::from(filter.page.limit()))
            .offset(i64::from(filter.page.offset()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EventPersistenceError::query)?;

        Ok(Page::new(filter.page, items, total.unsigned_abs()))
    }
}
