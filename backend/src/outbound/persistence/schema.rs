//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Name shown on receipts and greetings.
        display_name -> Varchar,
        /// Unique contact email, stored normalised.
        email -> Varchar,
        /// Unique contact phone, stored normalised.
        phone -> Nullable<Varchar>,
        /// Argon2 PHC-format password hash.
        password_hash -> Varchar,
        /// Access level (supporter, admin).
        role -> Varchar,
        /// Whether the email address has been verified.
        email_verified -> Bool,
        /// Whether the phone number has been verified.
        phone_verified -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Fundraising campaigns with running totals.
    causes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique URL-safe identifier.
        slug -> Varchar,
        /// Campaign headline.
        title -> Varchar,
        /// Short public description.
        summary -> Text,
        /// Funding goal in minor units, when set.
        goal_minor -> Nullable<Int8>,
        /// Cumulative amount raised in minor units.
        raised_minor -> Int8,
        /// Cumulative count of successful donations.
        donors_count -> Int8,
        /// Lifecycle state (draft, active, completed, archived).
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contribution ledger.
    donations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Amount in minor currency units.
        amount_minor -> Int8,
        /// ISO 4217 currency code.
        currency -> Varchar,
        /// Donor's name as entered.
        donor_name -> Varchar,
        /// Donor's contact email.
        donor_email -> Varchar,
        /// Funded cause, when not a general donation.
        cause_id -> Nullable<Uuid>,
        /// Gateway order id while pending, payment id once settled. Unique.
        transaction_id -> Varchar,
        /// Settlement state (pending, successful, failed).
        status -> Varchar,
        /// Receipt number, assigned once on successful settlement.
        receipt_no -> Nullable<Varchar>,
        /// Whether the donor asked not to be named publicly.
        anonymous -> Bool,
        /// Optional dedication text (sanitised inline markup).
        dedication -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Community events.
    events (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique URL-safe identifier.
        slug -> Varchar,
        /// Event headline.
        title -> Varchar,
        /// Category used for filtering.
        category -> Varchar,
        /// Lifecycle state (upcoming, ongoing, completed, cancelled).
        status -> Varchar,
        /// Scheduled start time.
        starts_at -> Timestamptz,
        /// Maximum participants, when capped.
        capacity -> Nullable<Int4>,
        /// Registered participant count.
        registered_count -> Int4,
        /// Organising staff account, when known.
        organizer_id -> Nullable<Uuid>,
        /// Public description.
        description -> Text,
    }
}

diesel::table! {
    /// Newsletter subscriptions.
    newsletter_subscribers (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique subscribed address, stored normalised.
        email -> Varchar,
        /// Subscription timestamp.
        subscribed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact, volunteer, and feedback form submissions.
    messages (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Originating form (contact, volunteer, feedback).
        kind -> Varchar,
        /// Sender's name, sanitised.
        name -> Varchar,
        /// Sender's email, normalised.
        email -> Varchar,
        /// Sender's phone, normalised, when provided.
        phone -> Nullable<Varchar>,
        /// Optional subject line, sanitised.
        subject -> Nullable<Varchar>,
        /// Message body, sanitised.
        body -> Text,
        /// Submission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(causes, donations);
