//! Form intake model for contact, volunteer, and feedback submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which public form produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// General contact form.
    Contact,
    /// Volunteer interest form.
    Volunteer,
    /// Feedback form.
    Feedback,
}

impl MessageKind {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Volunteer => "volunteer",
            Self::Feedback => "feedback",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "contact" => Some(Self::Contact),
            "volunteer" => Some(Self::Volunteer),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }
}

/// A persisted form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Stable message identifier.
    pub id: Uuid,
    /// Originating form.
    pub kind: MessageKind,
    /// Sender's name, sanitised.
    pub name: String,
    /// Sender's email, normalised.
    pub email: String,
    /// Sender's phone, normalised, when provided.
    pub phone: Option<String>,
    /// Optional subject line, sanitised.
    pub subject: Option<String>,
    /// Message body, sanitised.
    pub body: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for recording a form submission.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Originating form.
    pub kind: MessageKind,
    /// Sender's name, sanitised.
    pub name: String,
    /// Sender's email, normalised.
    pub email: String,
    /// Sender's phone, normalised, when provided.
    pub phone: Option<String>,
    /// Optional subject line, sanitised.
    pub subject: Option<String>,
    /// Message body, sanitised.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_stored_form() {
        for kind in [
            MessageKind::Contact,
            MessageKind::Volunteer,
            MessageKind::Feedback,
        ] {
            assert_eq!(MessageKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::parse("complaint"), None);
    }
}
