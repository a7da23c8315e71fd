//! Fundraising cause model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::slug::Slug;

/// Lifecycle of a fundraising cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CauseStatus {
    /// Being prepared; not publicly listed.
    Draft,
    /// Accepting donations.
    Active,
    /// Goal reached or campaign ended; still visible.
    Completed,
    /// Removed from public listings.
    Archived,
}

impl CauseStatus {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// A fundraising campaign with a running total.
///
/// ## Invariants
/// - `raised_minor` and `donors_count` are monotonically non-decreasing and
///   move only when a donation transitions to successful.
#[derive(Debug, Clone, PartialEq)]
pub struct Cause {
    /// Stable cause identifier.
    pub id: Uuid,
    /// Unique URL-safe identifier for the public page.
    pub slug: Slug,
    /// Campaign headline.
    pub title: String,
    /// Short public description.
    pub summary: String,
    /// Funding goal in minor units, when the campaign has one.
    pub goal_minor: Option<i64>,
    /// Cumulative amount raised in minor units.
    pub raised_minor: i64,
    /// Cumulative count of successful donations.
    pub donors_count: i64,
    /// Lifecycle state.
    pub status: CauseStatus,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn status_round_trips_through_stored_form() {
        for status in [
            CauseStatus::Draft,
            CauseStatus::Active,
            CauseStatus::Completed,
            CauseStatus::Archived,
        ] {
            assert_eq!(CauseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CauseStatus::parse("paused"), None);
    }
}
