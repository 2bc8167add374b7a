//! Port abstraction for the event catalogue collaborator.
//!
//! The catalogue owns event records; this service only reads the capacity
//! ceiling. Event creation, mutation, and view counting live elsewhere.

use async_trait::async_trait;

use crate::domain::{Capacity, EventId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event catalogue adapters.
    pub enum EventCatalogError {
        /// The event does not exist in the catalogue.
        UnknownEvent => "event does not exist in the catalogue",
        /// Catalogue connection could not be established.
        Connection { message: String } => "event catalogue connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "event catalogue query failed: {message}",
    }
}

/// Read-only port for event capacity lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Capacity ceiling for the event; `Capacity::Unlimited` for a null
    /// stored limit.
    async fn capacity_of(&self, event_id: EventId) -> Result<Capacity, EventCatalogError>;
}
