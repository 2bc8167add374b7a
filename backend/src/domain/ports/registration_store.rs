//! Port abstraction for the durable registration store.
//!
//! The store owns the only shared mutable state in the system: the set of
//! active registration rows per event. Adapters must execute each method as
//! one atomic unit (a serializable transaction or equivalent) so the
//! capacity invariant and the one-active-row rule hold under concurrent
//! calls across any number of coordinator processes.

use async_trait::async_trait;

use crate::domain::{AttendeeId, Capacity, EventId, Registration};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration store adapters.
    pub enum RegistrationStoreError {
        /// An active row already exists for this (attendee, event) pair.
        AlreadyActive => "an active registration already exists for this attendee and event",
        /// No active row exists for this (attendee, event) pair.
        NotRegistered => "no active registration exists for this attendee and event",
        /// The transaction was aborted by a concurrent conflicting update.
        SerializationConflict => "transaction aborted by a concurrent conflicting update",
        /// Store connection could not be established or was lost.
        Connection { message: String } => "registration store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "registration store query failed: {message}",
    }
}

impl RegistrationStoreError {
    /// Whether the failed call may be retried transparently.
    ///
    /// Serialization conflicts and connection losses never leave partial
    /// state behind, so the whole unit can simply run again.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SerializationConflict | Self::Connection { .. })
    }
}

/// Outcome of a cancellation: the removed row and, when the freed seat was
/// confirmed and a waitlisted row existed, the promoted successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// The deleted registration, carrying its prior status.
    pub cancelled: Registration,
    /// The oldest waitlisted registration, now confirmed, if any.
    pub promoted: Option<Registration>,
}

/// Port for the atomic registration lifecycle operations.
///
/// Both methods are single atomic units against the store:
///
/// - `register` checks for an existing active row, derives the confirmed
///   count, decides admit-versus-waitlist against `capacity`, and inserts
///   exactly one row.
/// - `cancel` deletes the caller's active row and, when the prior status was
///   `registered` and headroom remains, flips the oldest waitlisted row
///   (ordered by `created_at`, ties by `id`) to `registered`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Admit or waitlist `attendee_id` for `event_id`.
    ///
    /// Returns the inserted row. Fails with
    /// [`RegistrationStoreError::AlreadyActive`] if an active row exists.
    async fn register(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Registration, RegistrationStoreError>;

    /// Remove the caller's active row and promote a successor if a confirmed
    /// seat was freed.
    ///
    /// Fails with [`RegistrationStoreError::NotRegistered`] if no active row
    /// exists. Removing a waitlisted row never triggers promotion.
    async fn cancel(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Cancellation, RegistrationStoreError>;
}
