//! Registration aggregate and its value objects.
//!
//! A registration records one attendee's relationship to one event. Exactly
//! one active row may exist per (attendee, event) pair; cancellation removes
//! the row rather than flagging it, so "active" and "present" coincide.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable identifier for an attendee (a platform user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(Uuid);

/// Stable identifier for an event in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

/// Stable identifier for a registration row, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

uuid_id!(AttendeeId);
uuid_id!(EventId);
uuid_id!(RegistrationId);

/// Lifecycle state of an active registration.
///
/// There is no third state: cancellation deletes the row. The only in-place
/// transition is promotion, `Waitlisted` to `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// The attendee holds a confirmed seat.
    Registered,
    /// The attendee is queued for the next freed seat.
    Waitlisted,
}

impl RegistrationStatus {
    /// Canonical lowercase name, matching the stored column value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Waitlisted => "waitlisted",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown registration status: {value}")]
pub struct ParseRegistrationStatusError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for RegistrationStatus {
    type Err = ParseRegistrationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "waitlisted" => Ok(Self::Waitlisted),
            other => Err(ParseRegistrationStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Maximum number of confirmed seats for an event.
///
/// The catalogue stores this as a nullable integer; `NULL` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// No ceiling: every registration is admitted.
    Unlimited,
    /// At most this many `registered` rows may exist. Zero is legal and
    /// waitlists every registrant.
    Limited(u32),
}

/// Validation error raised when converting a stored capacity value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event capacity must not be negative, got {value}")]
pub struct CapacityOutOfRange {
    /// The rejected stored value.
    pub value: i32,
}

impl Capacity {
    /// Build a capacity from the catalogue's nullable column value.
    pub fn from_limit(limit: Option<i32>) -> Result<Self, CapacityOutOfRange> {
        match limit {
            None => Ok(Self::Unlimited),
            Some(value) => u32::try_from(value)
                .map(Self::Limited)
                .map_err(|_| CapacityOutOfRange { value }),
        }
    }

    /// The numeric ceiling, if any.
    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(value) => Some(value),
        }
    }

    /// Whether another confirmed seat fits given the current confirmed count.
    pub fn has_headroom(self, confirmed: i64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(value) => confirmed < i64::from(value),
        }
    }

    /// The admission decision: the status a new registrant receives when the
    /// event currently has `confirmed` registered rows.
    pub fn admission_for(self, confirmed: i64) -> RegistrationStatus {
        if self.has_headroom(confirmed) {
            RegistrationStatus::Registered
        } else {
            RegistrationStatus::Waitlisted
        }
    }
}

/// Error raised by [`Registration::promoted`] for an illegal transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("only waitlisted registrations can be promoted, this one is {status}")]
pub struct PromotionError {
    /// The status that blocked promotion.
    pub status: RegistrationStatus,
}

/// One attendee's active relationship to one event.
///
/// ## Invariants
/// - At most one active registration exists per (attendee, event) pair.
/// - `created_at` orders waitlist promotion FIFO, ties broken by `id`.
/// - Promotion preserves `id`, `attendee_id`, `event_id`, and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    id: RegistrationId,
    attendee_id: AttendeeId,
    event_id: EventId,
    status: RegistrationStatus,
    created_at: DateTime<Utc>,
}

impl Registration {
    /// Assemble a registration from its components.
    pub const fn new(
        id: RegistrationId,
        attendee_id: AttendeeId,
        event_id: EventId,
        status: RegistrationStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            attendee_id,
            event_id,
            status,
            created_at,
        }
    }

    /// Row identifier.
    pub const fn id(&self) -> RegistrationId {
        self.id
    }

    /// Owning attendee.
    pub const fn attendee_id(&self) -> AttendeeId {
        self.attendee_id
    }

    /// Target event.
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Current lifecycle state.
    pub const fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Creation timestamp, the FIFO key for waitlist promotion.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply the promotion transition, waitlisted to registered.
    ///
    /// Everything but the status is preserved; a confirmed registration
    /// cannot be promoted again.
    pub fn promoted(self) -> Result<Self, PromotionError> {
        match self.status {
            RegistrationStatus::Waitlisted => Ok(Self {
                status: RegistrationStatus::Registered,
                ..self
            }),
            status => Err(PromotionError { status }),
        }
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
