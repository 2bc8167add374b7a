//! Domain layer: entities, ports, and the registration coordinator.
//!
//! Purpose: hold everything transport- and storage-agnostic. Inbound
//! adapters call the driving port, outbound adapters implement the driven
//! ports, and the invariants (capacity ceiling, one active row per pair,
//! FIFO promotion) are stated here and enforced at the storage boundary.

pub mod error;
pub mod ports;
pub mod registration;
pub mod registration_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration::{
    AttendeeId, Capacity, CapacityOutOfRange, EventId, ParseRegistrationStatusError,
    PromotionError, Registration, RegistrationId, RegistrationStatus,
};
pub use self::registration_service::{RegistrationService, RetryPolicy};
