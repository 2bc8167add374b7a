//! PostgreSQL persistence adapters.
//!
//! Implements the registration store and event catalogue ports with Diesel
//! over an async connection pool, plus the embedded migration runner.

pub mod diesel_event_catalog;
pub mod diesel_registration_store;
pub mod migrations;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_event_catalog::DieselEventCatalog;
pub use diesel_registration_store::DieselRegistrationStore;
pub use migrations::{run_pending_migrations, MigrationError};
pub use pool::{DbPool, PoolConfig, PoolError};
