//! Registration coordinator service.
//!
//! Implements the driving [`RegistrationCommand`] port over the driven
//! store, catalogue, and notifier ports. The service itself is stateless:
//! all coordination is delegated to the store's atomic operations, so any
//! number of replicas may run concurrently. Its own responsibilities are
//! capacity lookup, bounded transparent retry of transient store failures,
//! error mapping, and best-effort confirmation dispatch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::domain::ports::{
    CancelRequest, CancellationReceipt, EventCatalog, EventCatalogError, RegisterRequest,
    RegistrationCommand, RegistrationNotifier, RegistrationReceipt, RegistrationStore,
    RegistrationStoreError,
};
use crate::domain::{AttendeeId, Capacity, Error, EventId, Registration, RegistrationStatus};

/// Bounded retry schedule for transient store failures.
///
/// Serialization conflicts are expected under contention on a hot event;
/// the whole atomic unit is simply run again after a short, jittered pause.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy; `max_attempts` counts the initial call and is clamped
    /// to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total number of attempts, including the initial call.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt` (1-based): exponential backoff
    /// plus up to 50% random jitter to spread contending retries apart.
    fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(1_u32 << attempt.min(4).saturating_sub(1));
        let jitter_cap = backoff.as_millis() / 2;
        let jitter = if jitter_cap == 0 {
            0
        } else {
            SmallRng::from_entropy().gen_range(0..=jitter_cap)
        };
        backoff + Duration::from_millis(u64::try_from(jitter).unwrap_or(u64::MAX))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(25))
    }
}

/// Coordinator for the registration lifecycle.
#[derive(Clone)]
pub struct RegistrationService<S, C, N> {
    store: Arc<S>,
    catalog: Arc<C>,
    notifier: Arc<N>,
    retry: RetryPolicy,
}

impl<S, C, N> RegistrationService<S, C, N> {
    /// Create a service with the default retry policy.
    pub fn new(store: Arc<S>, catalog: Arc<C>, notifier: Arc<N>) -> Self {
        Self {
            store,
            catalog,
            notifier,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn map_catalog_error(error: &EventCatalogError) -> Error {
    match error {
        EventCatalogError::UnknownEvent => Error::not_found("Event not found"),
        EventCatalogError::Connection { .. } => {
            Error::service_unavailable("Event catalogue is temporarily unavailable")
        }
        EventCatalogError::Query { message } => {
            Error::internal(format!("event catalogue failure: {message}"))
        }
    }
}

fn map_store_error(error: &RegistrationStoreError) -> Error {
    match error {
        RegistrationStoreError::AlreadyActive => {
            Error::invalid_request("Already registered or waitlisted for this event")
        }
        RegistrationStoreError::NotRegistered => Error::not_found("Not registered for this event"),
        // Transient failures that survived the retry budget surface as a
        // generic retryable rejection; storage detail stays in the logs.
        RegistrationStoreError::SerializationConflict
        | RegistrationStoreError::Connection { .. } => {
            Error::service_unavailable("Registration is temporarily unavailable")
        }
        RegistrationStoreError::Query { message } => {
            Error::internal(format!("registration store failure: {message}"))
        }
    }
}

impl<S, C, N> RegistrationService<S, C, N>
where
    S: RegistrationStore,
    C: EventCatalog,
    N: RegistrationNotifier + 'static,
{
    async fn capacity_of(&self, event_id: EventId) -> Result<Capacity, Error> {
        self.catalog.capacity_of(event_id).await.map_err(|error| {
            warn!(%event_id, %error, "event capacity lookup failed");
            map_catalog_error(&error)
        })
    }

    /// Run one atomic store operation, transparently retrying transient
    /// failures up to the policy's attempt budget.
    async fn run_with_retries<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RegistrationStoreError>>,
    {
        let mut attempt = 1_u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < self.retry.max_attempts() => {
                    warn!(operation, attempt, %error, "transient store failure, retrying");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(operation, attempt, %error, "store operation failed");
                    return Err(map_store_error(&error));
                }
            }
        }
    }

    /// Fire-and-forget confirmation dispatch. Failure is logged and dropped;
    /// it never rolls back or fails the registration.
    fn dispatch_confirmation(&self, attendee_id: AttendeeId, event_id: EventId) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(error) = notifier.registration_confirmed(attendee_id, event_id).await {
                warn!(%attendee_id, %event_id, %error, "confirmation notification dropped");
            }
        });
    }
}

#[async_trait]
impl<S, C, N> RegistrationCommand for RegistrationService<S, C, N>
where
    S: RegistrationStore + 'static,
    C: EventCatalog + 'static,
    N: RegistrationNotifier + 'static,
{
    async fn register(&self, request: RegisterRequest) -> Result<RegistrationReceipt, Error> {
        let RegisterRequest {
            attendee_id,
            event_id,
        } = request;

        let capacity = self.capacity_of(event_id).await?;
        let store = Arc::clone(&self.store);
        let registration = self
            .run_with_retries("register", || {
                store.register(attendee_id, event_id, capacity)
            })
            .await?;

        info!(
            %attendee_id,
            %event_id,
            registration_id = %registration.id(),
            status = %registration.status(),
            "registration recorded"
        );

        if registration.status() == RegistrationStatus::Registered {
            self.dispatch_confirmation(attendee_id, event_id);
        }

        Ok(RegistrationReceipt {
            registration_id: registration.id(),
            status: registration.status(),
        })
    }

    async fn cancel(&self, request: CancelRequest) -> Result<CancellationReceipt, Error> {
        let CancelRequest {
            attendee_id,
            event_id,
        } = request;

        let capacity = self.capacity_of(event_id).await?;
        let store = Arc::clone(&self.store);
        let cancellation = self
            .run_with_retries("cancel", || store.cancel(attendee_id, event_id, capacity))
            .await?;

        info!(
            %attendee_id,
            %event_id,
            released_status = %cancellation.cancelled.status(),
            "registration cancelled"
        );
        if let Some(promoted) = &cancellation.promoted {
            info!(
                %event_id,
                registration_id = %promoted.id(),
                promoted_attendee = %promoted.attendee_id(),
                "waitlisted registration promoted into freed seat"
            );
        }

        Ok(CancellationReceipt {
            released_status: cancellation.cancelled.status(),
            promoted: cancellation.promoted.as_ref().map(Registration::id),
        })
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
