//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Row-to-domain conversions live here so each repository only maps
//! errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cause::{Cause, CauseStatus};
use crate::domain::donation::{Donation, DonationStatus, ReceiptNo};
use crate::domain::event::{Event, EventStatus};
use crate::domain::message::{Message, MessageKind};
use crate::domain::money::{Amount, CurrencyCode};
use crate::domain::slug::Slug;
use crate::domain::user::{EmailAddress, PhoneNumber, User, UserRole};

use super::schema::{causes, donations, events, messages, newsletter_subscribers, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(&row.email)
            .map_err(|err| format!("stored email is invalid: {err}"))?;
        let phone = row
            .phone
            .as_deref()
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|err| format!("stored phone is invalid: {err}"))?;
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| format!("stored role is invalid: {}", row.role))?;
        Ok(Self {
            id: row.id,
            display_name: row.display_name,
            email,
            phone,
            password_hash: row.password_hash,
            role,
            email_verified: row.email_verified,
            phone_verified: row.phone_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Causes
// ---------------------------------------------------------------------------

/// Row struct for reading from the causes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = causes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CauseRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub goal_minor: Option<i64>,
    pub raised_minor: i64,
    pub donors_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CauseRow> for Cause {
    type Error = String;

    fn try_from(row: CauseRow) -> Result<Self, Self::Error> {
        let slug =
            Slug::new(row.slug).map_err(|err| format!("stored slug is invalid: {err}"))?;
        let status = CauseStatus::parse(&row.status)
            .ok_or_else(|| format!("stored cause status is invalid: {}", row.status))?;
        Ok(Self {
            id: row.id,
            slug,
            title: row.title,
            summary: row.summary,
            goal_minor: row.goal_minor,
            raised_minor: row.raised_minor,
            donors_count: row.donors_count,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

/// Row struct for reading from the donations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonationRow {
    pub id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub donor_name: String,
    pub donor_email: String,
    pub cause_id: Option<Uuid>,
    pub transaction_id: String,
    pub status: String,
    pub receipt_no: Option<String>,
    pub anonymous: bool,
    pub dedication: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = String;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        let amount = Amount::from_minor(row.amount_minor)
            .map_err(|err| format!("stored amount is invalid: {err}"))?;
        let currency = CurrencyCode::new(&row.currency)
            .map_err(|err| format!("stored currency is invalid: {err}"))?;
        let status = DonationStatus::parse(&row.status)
            .ok_or_else(|| format!("stored donation status is invalid: {}", row.status))?;
        Ok(Self {
            id: row.id,
            amount,
            currency,
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            cause_id: row.cause_id,
            transaction_id: row.transaction_id,
            status,
            receipt_no: row.receipt_no.map(ReceiptNo::from_stored),
            anonymous: row.anonymous,
            dedication: row.dedication,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new donation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub(crate) struct NewDonationRow<'a> {
    pub id: Uuid,
    pub amount_minor: i64,
    pub currency: &'a str,
    pub donor_name: &'a str,
    pub donor_email: &'a str,
    pub cause_id: Option<Uuid>,
    pub transaction_id: &'a str,
    pub status: &'a str,
    pub anonymous: bool,
    pub dedication: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when settling a donation. A `None` receipt leaves the
/// stored value untouched, which is how assign-once is enforced.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = donations)]
pub(crate) struct DonationSettleChangeset<'a> {
    pub transaction_id: &'a str,
    pub status: &'a str,
    pub receipt_no: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub category: String,
    pub status: String,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub registered_count: i32,
    pub organizer_id: Option<Uuid>,
    pub description: String,
}

impl TryFrom<EventRow> for Event {
    type Error = String;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let slug =
            Slug::new(row.slug).map_err(|err| format!("stored slug is invalid: {err}"))?;
        let status = EventStatus::parse(&row.status)
            .ok_or_else(|| format!("stored event status is invalid: {}", row.status))?;
        Ok(Self {
            id: row.id,
            slug,
            title: row.title,
            category: row.category,
            status,
            starts_at: row.starts_at,
            capacity: row.capacity,
            registered_count: row.registered_count,
            organizer_id: row.organizer_id,
            description: row.description,
        })
    }
}

// ---------------------------------------------------------------------------
// Newsletter subscribers
// ---------------------------------------------------------------------------

/// Insertable struct for creating subscription records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = newsletter_subscribers)]
pub(crate) struct NewSubscriberRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub subscribed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Insertable struct for creating form submission records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

impl NewMessageRow<'_> {
    pub(crate) fn into_message(self, kind: MessageKind) -> Message {
        Message {
            id: self.id,
            kind,
            name: self.name.to_owned(),
            email: self.email.to_owned(),
            phone: self.phone.map(ToOwned::to_owned),
            subject: self.subject.map(ToOwned::to_owned),
            body: self.body.to_owned(),
            created_at: self.created_at,
        }
    }
}
