//! PostgreSQL-backed [`RegistrationStore`] implementation using Diesel ORM.
//!
//! Each port method runs as one SERIALIZABLE transaction, so the admit-or-
//! waitlist decision and the cancel-then-promote step are atomic with the
//! reads they depend on. Concurrency control is left entirely to the
//! database: a conflicting interleaving aborts with a serialization failure
//! that the coordinator retries, and the unique constraint on
//! `(attendee_id, event_id)` backs the one-active-row invariant even across
//! server processes.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{Cancellation, RegistrationStore, RegistrationStoreError};
use crate::domain::{
    AttendeeId, Capacity, EventId, Registration, RegistrationId, RegistrationStatus,
};

use super::models::{NewRegistrationRow, RegistrationRow};
use super::pool::{DbPool, PoolError};
use super::schema::registrations;

/// Diesel-backed implementation of the registration store port.
#[derive(Clone)]
pub struct DieselRegistrationStore {
    pool: DbPool,
}

impl DieselRegistrationStore {
    /// Create a new store with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to port errors.
fn map_pool_error(error: PoolError) -> RegistrationStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RegistrationStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to port errors.
fn map_diesel_error(error: diesel::result::Error) -> RegistrationStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(kind, _) => match kind {
            // The transaction lost a serializable conflict; safe to rerun.
            DatabaseErrorKind::SerializationFailure => {
                RegistrationStoreError::serialization_conflict()
            }
            // The (attendee_id, event_id) constraint: a concurrent insert
            // won the race for this pair.
            DatabaseErrorKind::UniqueViolation => RegistrationStoreError::already_active(),
            DatabaseErrorKind::ClosedConnection => {
                RegistrationStoreError::connection("database connection closed")
            }
            _ => RegistrationStoreError::query("database error"),
        },
        DieselError::NotFound => RegistrationStoreError::query("record not found"),
        _ => RegistrationStoreError::query("database error"),
    }
}

/// Transaction-internal error carrier, so `?` works on both Diesel results
/// and already-classified port errors inside the closure.
enum TxError {
    Store(RegistrationStoreError),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<RegistrationStoreError> for TxError {
    fn from(error: RegistrationStoreError) -> Self {
        Self::Store(error)
    }
}

fn resolve_tx_error(error: TxError) -> RegistrationStoreError {
    match error {
        TxError::Store(error) => error,
        TxError::Diesel(error) => map_diesel_error(error),
    }
}

/// Convert a database row into a validated domain registration.
fn row_to_registration(row: RegistrationRow) -> Result<Registration, RegistrationStoreError> {
    let status: RegistrationStatus = row
        .status
        .parse()
        .map_err(|err| RegistrationStoreError::query(format!("corrupted status column: {err}")))?;

    Ok(Registration::new(
        RegistrationId::from_uuid(row.id),
        AttendeeId::from_uuid(row.attendee_id),
        EventId::from_uuid(row.event_id),
        status,
        row.created_at,
    ))
}

/// Count of confirmed rows for the event, derived live inside the enclosing
/// transaction rather than read from a maintained counter.
async fn confirmed_count(
    conn: &mut diesel_async::AsyncPgConnection,
    event_id: EventId,
) -> Result<i64, diesel::result::Error> {
    registrations::table
        .filter(
            registrations::event_id
                .eq(event_id.as_uuid())
                .and(registrations::status.eq(RegistrationStatus::Registered.as_str())),
        )
        .count()
        .get_result(conn)
        .await
}

#[async_trait]
impl RegistrationStore for DieselRegistrationStore {
    async fn register(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Registration, RegistrationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: RegistrationRow = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let existing: Option<Uuid> = registrations::table
                        .filter(
                            registrations::attendee_id
                                .eq(attendee_id.as_uuid())
                                .and(registrations::event_id.eq(event_id.as_uuid())),
                        )
                        .select(registrations::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if existing.is_some() {
                        return Err(TxError::from(RegistrationStoreError::already_active()));
                    }

                    let confirmed = confirmed_count(conn, event_id).await?;
                    let status = capacity.admission_for(confirmed);

                    let new_row = NewRegistrationRow {
                        id: *RegistrationId::random().as_uuid(),
                        attendee_id: *attendee_id.as_uuid(),
                        event_id: *event_id.as_uuid(),
                        status: status.as_str(),
                    };

                    let inserted: RegistrationRow = diesel::insert_into(registrations::table)
                        .values(&new_row)
                        .returning(RegistrationRow::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok(inserted)
                }
                .scope_boxed()
            })
            .await
            .map_err(resolve_tx_error)?;

        row_to_registration(row)
    }

    async fn cancel(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Cancellation, RegistrationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (cancelled_row, promoted_row) = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let deleted: Option<RegistrationRow> = diesel::delete(
                        registrations::table.filter(
                            registrations::attendee_id
                                .eq(attendee_id.as_uuid())
                                .and(registrations::event_id.eq(event_id.as_uuid())),
                        ),
                    )
                    .returning(RegistrationRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(cancelled) = deleted else {
                        return Err(TxError::from(RegistrationStoreError::not_registered()));
                    };

                    // Only a freed confirmed seat can admit a successor;
                    // removing a waitlisted row changes nothing.
                    let mut promoted = None;
                    if cancelled.status == RegistrationStatus::Registered.as_str() {
                        let confirmed = confirmed_count(conn, event_id).await?;
                        if capacity.has_headroom(confirmed) {
                            promoted = promote_oldest_waitlisted(conn, event_id).await?;
                        }
                    }

                    Ok((cancelled, promoted))
                }
                .scope_boxed()
            })
            .await
            .map_err(resolve_tx_error)?;

        Ok(Cancellation {
            cancelled: row_to_registration(cancelled_row)?,
            promoted: promoted_row.map(row_to_registration).transpose()?,
        })
    }
}

/// Flip the oldest waitlisted row (FIFO by `created_at`, ties by `id`) to
/// `registered`, if one exists.
async fn promote_oldest_waitlisted(
    conn: &mut diesel_async::AsyncPgConnection,
    event_id: EventId,
) -> Result<Option<RegistrationRow>, diesel::result::Error> {
    let next: Option<Uuid> = registrations::table
        .filter(
            registrations::event_id
                .eq(event_id.as_uuid())
                .and(registrations::status.eq(RegistrationStatus::Waitlisted.as_str())),
        )
        .order((registrations::created_at.asc(), registrations::id.asc()))
        .select(registrations::id)
        .first(conn)
        .await
        .optional()?;

    let Some(id) = next else {
        return Ok(None);
    };

    diesel::update(registrations::table.find(id))
        .set(registrations::status.eq(RegistrationStatus::Registered.as_str()))
        .returning(RegistrationRow::as_returning())
        .get_result(conn)
        .await
        .map(Some)
}
