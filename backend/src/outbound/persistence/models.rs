//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Rows are converted to domain types through validated
//! constructors before leaving the adapters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::registrations;

/// Row struct for reading from the registrations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub event_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new registration rows.
///
/// `created_at` is left to the database default so insertion order and the
/// FIFO timestamp cannot drift apart across server clocks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow<'a> {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub event_id: Uuid,
    pub status: &'a str,
}
