//! Driven port for event reads.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::event::{Event, EventFilter};
use crate::domain::slug::Slug;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by event repository adapters.
    pub enum EventPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "event repository query failed: {message}",
    }
}

/// Port for reading community events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fetch an event by its public slug.
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Event>, EventPersistenceError>;

    /// List events matching the filter, soonest first.
    ///
    /// `now` anchors the `upcoming_only` criterion so callers (and tests)
    /// control the reference time.
    async fn list(
        &self,
        filter: &EventFilter,
        now: DateTime<Utc>,
    ) -> Result<Page<Event>, EventPersistenceError>;
}

/// In-memory event calendar used without a database pool and in tests.
#[derive(Debug, Default)]
pub struct InMemoryEventCalendar {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventCalendar {
    /// Create an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calendar pre-populated with the given events.
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Add an event to the calendar.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn add(&self, event: Event) {
        self.events.lock().expect("event calendar lock").push(event);
    }
}

fn matches_filter(event: &Event, filter: &EventFilter, now: DateTime<Utc>) -> bool {
    if let Some(category) = &filter.category {
        if !event.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if event.status != status {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let haystack = format!(
            "{} {}",
            event.title.to_lowercase(),
            event.description.to_lowercase()
        );
        if !haystack.contains(&needle) {
            return false;
        }
    }
    if filter.upcoming_only && event.starts_at <= now {
        return false;
    }
    true
}

#[async_trait]
impl EventRepository for InMemoryEventCalendar {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Event>, EventPersistenceError> {
        let events = self
            .events
            .lock()
            .map_err(|_| EventPersistenceError::query("event calendar lock poisoned"))?;
        Ok(events.iter().find(|event| &event.slug == slug).cloned())
    }

    async fn list(
        &self,
        filter: &EventFilter,
        now: DateTime<Utc>,
    ) -> Result<Page<Event>, EventPersistenceError> {
        let events = self
            .events
            .lock()
            .map_err(|_| EventPersistenceError::query("event calendar lock poisoned"))?;
        let mut matching: Vec<Event> = events
            .iter()
            .filter(|event| matches_filter(event, filter, now))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .collect();
        Ok(Page::new(filter.page, items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventStatus;
    use chrono::Duration;
    use rstest::rstest;
    use uuid::Uuid;

    fn event(slug: &str, category: &str, status: EventStatus, starts_in_hours: i64) -> Event {
        Event {
            id: Uuid::new_v4(),
            slug: Slug::new(slug).expect("valid slug"),
            title: format!("{slug} title"),
            category: category.to_owned(),
            status,
            starts_at: Utc::now() + Duration::hours(starts_in_hours),
            capacity: Some(100),
            registered_count: 10,
            organizer_id: None,
            description: "A community gathering.".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_filters_by_category_and_upcoming() {
        let calendar = InMemoryEventCalendar::with_events(vec![
            event("walkathon", "fundraiser", EventStatus::Upcoming, 24),
            event("gala-dinner", "gala", EventStatus::Upcoming, 48),
            event("old-drive", "fundraiser", EventStatus::Completed, -24),
        ]);
        let filter = EventFilter {
            category: Some("fundraiser".to_owned()),
            upcoming_only: true,
            ..EventFilter::default()
        };

        let page = calendar
            .list(&filter, Utc::now())
            .await
            .expect("list succeeds");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug.as_ref(), "walkathon");
    }

    #[rstest]
    #[tokio::test]
    async fn list_searches_title_and_description() {
        let calendar = InMemoryEventCalendar::with_events(vec![
            event("walkathon", "fundraiser", EventStatus::Upcoming, 24),
            event("gala-dinner", "gala", EventStatus::Upcoming, 48),
        ]);
        let filter = EventFilter {
            search: Some("GALA".to_owned()),
            ..EventFilter::default()
        };

        let page = calendar
            .list(&filter, Utc::now())
            .await
            .expect("list succeeds");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug.as_ref(), "gala-dinner");
    }

    #[tokio::test]
    async fn list_orders_soonest_first() {
        let calendar = InMemoryEventCalendar::with_events(vec![
            event("later", "fundraiser", EventStatus::Upcoming, 72),
            event("sooner", "fundraiser", EventStatus::Upcoming, 2),
        ]);

        let page = calendar
            .list(&EventFilter::default(), Utc::now())
            .await
            .expect("list succeeds");
        assert_eq!(page.items[0].slug.as_ref(), "sooner");
    }
}
