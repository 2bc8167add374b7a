//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! type-safe SQL generation. Regenerate with `diesel print-schema` when the
//! migrations change.

diesel::table! {
    /// Event catalogue, read-only for this service.
    events (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable event title.
        #[max_length = 255]
        title -> Varchar,
        /// Confirmed-seat ceiling; NULL means unbounded.
        capacity -> Nullable<Int4>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Active registrations: one row per (attendee, event) pair, deleted on
    /// cancellation.
    registrations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning attendee.
        attendee_id -> Uuid,
        /// Target event.
        event_id -> Uuid,
        /// Either `registered` or `waitlisted`.
        #[max_length = 16]
        status -> Varchar,
        /// Insertion timestamp, the FIFO key for waitlist promotion.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(registrations -> events (event_id));
diesel::allow_tables_to_appear_in_same_query!(events, registrations);
