//! Event listing endpoints.
//!
//! ```text
//! GET /api/v1/events?category=fundraiser&status=upcoming&search=walk&upcoming=true&limit=20&offset=0
//! GET /api/v1/events/{slug}
//! ```

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use mockable::Clock as _;
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::EventPersistenceError;
use crate::domain::{Error, Event, EventFilter, EventStatus, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Public view of a community event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Stable event identifier.
    pub id: Uuid,
    /// URL-safe identifier for the public page.
    pub slug: String,
    /// Event headline.
    pub title: String,
    /// Category used for filtering.
    pub category: String,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,
    /// Maximum number of participants, when capped.
    pub capacity: Option<i32>,
    /// Number of registered participants.
    pub registered_count: i32,
    /// Public description.
    pub description: String,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            slug: event.slug.into(),
            title: event.title,
            category: event.category,
            status: event.status,
            starts_at: event.starts_at,
            capacity: event.capacity,
            registered_count: event.registered_count,
            description: event.description,
        }
    }
}

/// Query parameters for the event listing.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    category: Option<String>,
    status: Option<String>,
    search: Option<String>,
    upcoming: Option<bool>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl TryFrom<EventListQuery> for EventFilter {
    type Error = Error;

    fn try_from(query: EventListQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .as_deref()
            .map(|raw| {
                EventStatus::parse(raw).ok_or_else(|| {
                    Error::invalid_request(format!("unknown event status: {raw}"))
                        .with_details(json!({ "field": "status", "code": "unknown_status" }))
                })
            })
            .transpose()?;

        Ok(Self {
            category: query.category.filter(|value| !value.trim().is_empty()),
            status,
            search: query.search.filter(|value| !value.trim().is_empty()),
            upcoming_only: query.upcoming.unwrap_or(false),
            page: PageRequest::from_raw(query.limit, query.offset),
        })
    }
}

fn map_event_persistence_error(err: EventPersistenceError) -> Error {
    match err {
        EventPersistenceError::Connection { message } => Error::service_unavailable(message),
        EventPersistenceError::Query { message } => Error::internal(message),
    }
}

/// List events matching the filter.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tags = ["events"],
    security([]),
    params(
        ("category" = Option<String>, Query, description = "Category filter"),
        ("status" = Option<String>, Query, description = "Lifecycle filter"),
        ("search" = Option<String>, Query, description = "Title/description substring"),
        ("upcoming" = Option<bool>, Query, description = "Only events that have not started"),
        ("limit" = Option<u32>, Query, description = "Page size, clamped to 100"),
        ("offset" = Option<u32>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Events page"),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    )
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    query: web::Query<EventListQuery>,
) -> ApiResult<web::Json<Page<EventDto>>> {
    let filter = EventFilter::try_from(query.into_inner())?;
    let events = state
        .events
        .list(&filter, state.clock.utc())
        .await
        .map_err(map_event_persistence_error)?;
    Ok(web::Json(events.map(EventDto::from)))
}

/// Fetch one event by slug.
#[utoipa::path(
    get,
    path = "/api/v1/events/{slug}",
    tags = ["events"],
    security([]),
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event", body = EventDto),
        (status = 404, description = "Unknown slug", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    )
)]
#[get("/events/{slug}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventDto>> {
    let slug = Slug::new(path.into_inner()).map_err(|_| Error::not_found("no such event"))?;
    let event = state
        .events
        .find_by_slug(&slug)
        .await
        .map_err(map_event_persistence_error)?
        .ok_or_else(|| Error::not_found("no such event"))?;
    Ok(web::Json(EventDto::from(event)))
}
