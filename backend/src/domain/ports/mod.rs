//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches its collaborators (the
//! durable store, the event catalogue, the notification sender); the driving
//! port is what inbound adapters call. Each trait exposes strongly typed
//! errors so adapters map their failures into predictable variants.

mod macros;

pub mod event_catalog;
pub mod registration_command;
pub mod registration_notifier;
pub mod registration_store;

pub(crate) use macros::define_port_error;

pub use event_catalog::{EventCatalog, EventCatalogError};
pub use registration_command::{
    CancelRequest, CancellationReceipt, RegisterRequest, RegistrationCommand, RegistrationReceipt,
};
pub use registration_notifier::{NoopRegistrationNotifier, NotificationError, RegistrationNotifier};
pub use registration_store::{Cancellation, RegistrationStore, RegistrationStoreError};

#[cfg(test)]
pub use event_catalog::MockEventCatalog;
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
#[cfg(test)]
pub use registration_notifier::MockRegistrationNotifier;
#[cfg(test)]
pub use registration_store::MockRegistrationStore;
