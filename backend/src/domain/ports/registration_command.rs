//! Driving port for the registration coordinator.
//!
//! HTTP handlers depend on this trait, not on the concrete service, so they
//! stay testable with mocks and ignorant of retry and storage concerns.

use async_trait::async_trait;

use crate::domain::{AttendeeId, Error, EventId, RegistrationId, RegistrationStatus};

/// Request to register an attendee for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterRequest {
    /// The registrant.
    pub attendee_id: AttendeeId,
    /// The target event.
    pub event_id: EventId,
}

/// Result of a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// Identifier of the created row.
    pub registration_id: RegistrationId,
    /// `Registered` when admitted, `Waitlisted` when queued.
    pub status: RegistrationStatus,
}

/// Request to cancel an attendee's active registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelRequest {
    /// The cancelling attendee.
    pub attendee_id: AttendeeId,
    /// The target event.
    pub event_id: EventId,
}

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationReceipt {
    /// Status the removed row held before deletion.
    pub released_status: RegistrationStatus,
    /// Identifier of the waitlisted row promoted into the freed seat, if any.
    pub promoted: Option<RegistrationId>,
}

/// Use-case port covering the registration lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Register an attendee, admitting or waitlisting per event capacity.
    async fn register(&self, request: RegisterRequest) -> Result<RegistrationReceipt, Error>;

    /// Cancel an active registration, promoting a successor when a confirmed
    /// seat frees up.
    async fn cancel(&self, request: CancelRequest) -> Result<CancellationReceipt, Error>;
}
