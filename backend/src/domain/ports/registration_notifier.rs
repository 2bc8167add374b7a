//! Port abstraction for the notification sender collaborator.
//!
//! Confirmation notifications are fire-and-forget: the coordinator requests
//! delivery after a successful admission and never lets a delivery failure
//! affect the registration itself.

use async_trait::async_trait;

use crate::domain::{AttendeeId, EventId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters. Logged, never propagated.
    pub enum NotificationError {
        /// The notification could not be handed to the delivery channel.
        Delivery { message: String } => "confirmation delivery failed: {message}",
    }
}

/// Port for requesting registration confirmation notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationNotifier: Send + Sync {
    /// Ask the sender to confirm `attendee_id`'s admission to `event_id`.
    async fn registration_confirmed(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
    ) -> Result<(), NotificationError>;
}

/// Fixture implementation that silently accepts every notification.
///
/// Used when no delivery endpoint is configured and in tests where
/// notification behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistrationNotifier;

#[async_trait]
impl RegistrationNotifier for NoopRegistrationNotifier {
    async fn registration_confirmed(
        &self,
        _attendee_id: AttendeeId,
        _event_id: EventId,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
