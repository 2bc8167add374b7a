//! PostgreSQL-backed [`EventCatalog`] implementation using Diesel ORM.
//!
//! The catalogue is owned by the wider platform; this adapter performs the
//! single read this service needs, the capacity ceiling for an event.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{EventCatalog, EventCatalogError};
use crate::domain::{Capacity, EventId};

use super::pool::{DbPool, PoolError};
use super::schema::events;

/// Diesel-backed implementation of the event catalogue port.
#[derive(Clone)]
pub struct DieselEventCatalog {
    pool: DbPool,
}

impl DieselEventCatalog {
    /// Create a new catalogue with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to port errors.
fn map_pool_error(error: PoolError) -> EventCatalogError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            EventCatalogError::connection(message)
        }
    }
}

/// Map Diesel errors to port errors.
fn map_diesel_error(error: diesel::result::Error) -> EventCatalogError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "event capacity lookup failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            EventCatalogError::connection("database connection closed")
        }
        _ => EventCatalogError::query("database error"),
    }
}

#[async_trait]
impl EventCatalog for DieselEventCatalog {
    async fn capacity_of(&self, event_id: EventId) -> Result<Capacity, EventCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let limit: Option<Option<i32>> = events::table
            .find(event_id.as_uuid())
            .select(events::capacity)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(limit) = limit else {
            return Err(EventCatalogError::unknown_event());
        };

        Capacity::from_limit(limit).map_err(|err| EventCatalogError::query(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("no route to host"));
        assert!(matches!(error, EventCatalogError::Connection { .. }));
    }

    #[rstest]
    fn generic_diesel_error_maps_to_query_error() {
        let error = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(error, EventCatalogError::Query { .. }));
    }
}
