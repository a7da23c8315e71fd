//! Community event model and listing filter.

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::slug::Slug;

/// Lifecycle of a community event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Scheduled for a future date.
    Upcoming,
    /// Currently running.
    Ongoing,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl EventStatus {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "upcoming" => Some(Self::Upcoming),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A scheduled community event. Read-mostly: listings filter and paginate.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Stable event identifier.
    pub id: Uuid,
    /// Unique URL-safe identifier for the public page.
    pub slug: Slug,
    /// Event headline.
    pub title: String,
    /// Free-form category used for filtering (e.g. "fundraiser").
    pub category: String,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,
    /// Maximum number of participants, when capped.
    pub capacity: Option<i32>,
    /// Number of registered participants.
    pub registered_count: i32,
    /// Account of the organising staff member, when known.
    pub organizer_id: Option<Uuid>,
    /// Public description.
    pub description: String,
}

/// Listing filter for events; all criteria combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Keep only events in this category.
    pub category: Option<String>,
    /// Keep only events in this lifecycle state.
    pub status: Option<EventStatus>,
    /// Keep only events whose title or description contains this text.
    pub search: Option<String>,
    /// Keep only events starting after the request time.
    pub upcoming_only: bool,
    /// Pagination window.
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn status_round_trips_through_stored_form() {
        for status in [
            EventStatus::Upcoming,
            EventStatus::Ongoing,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("postponed"), None);
    }
}
