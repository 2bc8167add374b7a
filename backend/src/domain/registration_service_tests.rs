//! Tests for the registration coordinator.
//!
//! Port-level behaviour (error mapping, retry, notification dispatch) is
//! covered with mockall mocks; end-to-end lifecycle scenarios run against an
//! in-memory store fake that honours the same atomic contract as the real
//! adapter.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use super::*;
use crate::domain::ports::{
    Cancellation, MockEventCatalog, MockRegistrationStore, NoopRegistrationNotifier,
    NotificationError,
};
use crate::domain::{ErrorCode, RegistrationId};

fn registration(
    attendee_id: AttendeeId,
    event_id: EventId,
    status: RegistrationStatus,
) -> Registration {
    Registration::new(
        RegistrationId::random(),
        attendee_id,
        event_id,
        status,
        Utc::now(),
    )
}

fn catalog_with(capacity: Capacity) -> MockEventCatalog {
    let mut catalog = MockEventCatalog::new();
    catalog
        .expect_capacity_of()
        .returning(move |_| Ok(capacity));
    catalog
}

fn immediate_retries(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

/// Notifier fake that reports deliveries over a channel, so tests can await
/// the spawned dispatch deterministically.
struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(AttendeeId, EventId)>,
}

#[async_trait]
impl RegistrationNotifier for ChannelNotifier {
    async fn registration_confirmed(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
    ) -> Result<(), NotificationError> {
        self.tx
            .send((attendee_id, event_id))
            .map_err(|err| NotificationError::delivery(err.to_string()))
    }
}

#[tokio::test]
async fn register_admits_and_dispatches_confirmation() {
    let attendee_id = AttendeeId::random();
    let event_id = EventId::random();
    let admitted = registration(attendee_id, event_id, RegistrationStatus::Registered);
    let admitted_id = admitted.id();

    let mut store = MockRegistrationStore::new();
    store
        .expect_register()
        .times(1)
        .withf(move |a, e, capacity| {
            *a == attendee_id && *e == event_id && *capacity == Capacity::Limited(5)
        })
        .return_once(move |_, _, _| Ok(admitted));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Limited(5))),
        Arc::new(ChannelNotifier { tx }),
    );

    let receipt = service
        .register(RegisterRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect("admitted");

    assert_eq!(receipt.registration_id, admitted_id);
    assert_eq!(receipt.status, RegistrationStatus::Registered);

    let delivered = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("confirmation dispatched")
        .expect("channel open");
    assert_eq!(delivered, (attendee_id, event_id));
}

#[tokio::test]
async fn register_waitlists_without_notifying() {
    let attendee_id = AttendeeId::random();
    let event_id = EventId::random();
    let queued = registration(attendee_id, event_id, RegistrationStatus::Waitlisted);

    let mut store = MockRegistrationStore::new();
    store
        .expect_register()
        .times(1)
        .return_once(move |_, _, _| Ok(queued));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Limited(0))),
        Arc::new(ChannelNotifier { tx }),
    );

    let receipt = service
        .register(RegisterRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect("queued");

    assert_eq!(receipt.status, RegistrationStatus::Waitlisted);
    // No admission, no dispatch: nothing was ever spawned.
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn register_rejects_existing_active_registration() {
    let mut store = MockRegistrationStore::new();
    store
        .expect_register()
        .times(1)
        .return_once(|_, _, _| Err(RegistrationStoreError::already_active()));

    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Limited(5))),
        Arc::new(NoopRegistrationNotifier),
    );

    let error = service
        .register(RegisterRequest {
            attendee_id: AttendeeId::random(),
            event_id: EventId::random(),
        })
        .await
        .expect_err("duplicate rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.message(),
        "Already registered or waitlisted for this event"
    );
}

#[tokio::test]
async fn register_fails_for_unknown_event() {
    let mut catalog = MockEventCatalog::new();
    catalog
        .expect_capacity_of()
        .times(1)
        .return_once(|_| Err(EventCatalogError::unknown_event()));

    let service = RegistrationService::new(
        Arc::new(MockRegistrationStore::new()),
        Arc::new(catalog),
        Arc::new(NoopRegistrationNotifier),
    );

    let error = service
        .register(RegisterRequest {
            attendee_id: AttendeeId::random(),
            event_id: EventId::random(),
        })
        .await
        .expect_err("unknown event rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Event not found");
}

#[tokio::test]
async fn register_retries_serialization_conflicts() {
    let attendee_id = AttendeeId::random();
    let event_id = EventId::random();
    let admitted = registration(attendee_id, event_id, RegistrationStatus::Registered);

    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let mut store = MockRegistrationStore::new();
    store.expect_register().times(3).returning(move |_, _, _| {
        if seen.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(RegistrationStoreError::serialization_conflict())
        } else {
            Ok(admitted.clone())
        }
    });

    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Unlimited)),
        Arc::new(NoopRegistrationNotifier),
    )
    .with_retry_policy(immediate_retries(3));

    let receipt = service
        .register(RegisterRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect("third attempt succeeds");

    assert_eq!(receipt.status, RegistrationStatus::Registered);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn register_surfaces_transient_failure_after_retry_budget() {
    let mut store = MockRegistrationStore::new();
    store
        .expect_register()
        .times(2)
        .returning(|_, _, _| Err(RegistrationStoreError::serialization_conflict()));

    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Unlimited)),
        Arc::new(NoopRegistrationNotifier),
    )
    .with_retry_policy(immediate_retries(2));

    let error = service
        .register(RegisterRequest {
            attendee_id: AttendeeId::random(),
            event_id: EventId::random(),
        })
        .await
        .expect_err("budget exhausted");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn cancel_maps_missing_registration_to_not_found() {
    let mut store = MockRegistrationStore::new();
    store
        .expect_cancel()
        .times(1)
        .return_once(|_, _, _| Err(RegistrationStoreError::not_registered()));

    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Limited(5))),
        Arc::new(NoopRegistrationNotifier),
    );

    let error = service
        .cancel(CancelRequest {
            attendee_id: AttendeeId::random(),
            event_id: EventId::random(),
        })
        .await
        .expect_err("nothing to cancel");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Not registered for this event");
}

#[tokio::test]
async fn cancel_reports_promotion() {
    let event_id = EventId::random();
    let leaver = AttendeeId::random();
    let successor = AttendeeId::random();
    let cancelled = registration(leaver, event_id, RegistrationStatus::Registered);
    let promoted = registration(successor, event_id, RegistrationStatus::Waitlisted)
        .promoted()
        .expect("waitlisted promotes");
    let promoted_id = promoted.id();

    let mut store = MockRegistrationStore::new();
    store.expect_cancel().times(1).return_once(move |_, _, _| {
        Ok(Cancellation {
            cancelled,
            promoted: Some(promoted),
        })
    });

    let service = RegistrationService::new(
        Arc::new(store),
        Arc::new(catalog_with(Capacity::Limited(1))),
        Arc::new(NoopRegistrationNotifier),
    );

    let receipt = service
        .cancel(CancelRequest {
            attendee_id: leaver,
            event_id,
        })
        .await
        .expect("cancelled");

    assert_eq!(receipt.released_status, RegistrationStatus::Registered);
    assert_eq!(receipt.promoted, Some(promoted_id));
}

// ---------------------------------------------------------------------------
// Lifecycle scenarios against an in-memory store honouring the atomic
// contract: each call runs under one lock, promotion scans in insertion
// order (the FIFO created_at/id order of the real adapter).
// ---------------------------------------------------------------------------

#[derive(Default)]
struct InMemoryRegistrationStore {
    rows: Mutex<Vec<Registration>>,
}

impl InMemoryRegistrationStore {
    fn confirmed_count(rows: &[Registration], event_id: EventId) -> i64 {
        let count = rows
            .iter()
            .filter(|row| {
                row.event_id() == event_id && row.status() == RegistrationStatus::Registered
            })
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    fn snapshot(&self) -> Vec<Registration> {
        self.rows.lock().expect("store poisoned").clone()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn register(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Registration, RegistrationStoreError> {
        let mut rows = self.rows.lock().expect("store poisoned");
        if rows
            .iter()
            .any(|row| row.attendee_id() == attendee_id && row.event_id() == event_id)
        {
            return Err(RegistrationStoreError::already_active());
        }

        let status = capacity.admission_for(Self::confirmed_count(&rows, event_id));
        let row = Registration::new(
            RegistrationId::random(),
            attendee_id,
            event_id,
            status,
            Utc::now(),
        );
        rows.push(row.clone());
        Ok(row)
    }

    async fn cancel(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
        capacity: Capacity,
    ) -> Result<Cancellation, RegistrationStoreError> {
        let mut rows = self.rows.lock().expect("store poisoned");
        let position = rows
            .iter()
            .position(|row| row.attendee_id() == attendee_id && row.event_id() == event_id)
            .ok_or_else(RegistrationStoreError::not_registered)?;
        let cancelled = rows.remove(position);

        let mut promoted = None;
        if cancelled.status() == RegistrationStatus::Registered
            && capacity.has_headroom(Self::confirmed_count(&rows, event_id))
        {
            if let Some(next) = rows.iter_mut().find(|row| {
                row.event_id() == event_id && row.status() == RegistrationStatus::Waitlisted
            }) {
                *next = next.clone().promoted().expect("waitlisted promotes");
                promoted = Some(next.clone());
            }
        }

        Ok(Cancellation {
            cancelled,
            promoted,
        })
    }
}

type InMemoryService =
    RegistrationService<InMemoryRegistrationStore, MockEventCatalog, NoopRegistrationNotifier>;

fn scenario_service(capacity: Capacity) -> (InMemoryService, Arc<InMemoryRegistrationStore>) {
    let store = Arc::new(InMemoryRegistrationStore::default());
    let service = RegistrationService::new(
        Arc::clone(&store),
        Arc::new(catalog_with(capacity)),
        Arc::new(NoopRegistrationNotifier),
    );
    (service, store)
}

async fn register_one(
    service: &InMemoryService,
    attendee_id: AttendeeId,
    event_id: EventId,
) -> RegistrationReceipt {
    service
        .register(RegisterRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect("registration accepted")
}

#[tokio::test]
async fn capacity_one_cancellation_promotes_fifo() {
    let (service, store) = scenario_service(Capacity::Limited(1));
    let event_id = EventId::random();
    let (a, b, c) = (
        AttendeeId::random(),
        AttendeeId::random(),
        AttendeeId::random(),
    );

    assert_eq!(
        register_one(&service, a, event_id).await.status,
        RegistrationStatus::Registered
    );
    let b_receipt = register_one(&service, b, event_id).await;
    assert_eq!(b_receipt.status, RegistrationStatus::Waitlisted);
    assert_eq!(
        register_one(&service, c, event_id).await.status,
        RegistrationStatus::Waitlisted
    );

    let receipt = service
        .cancel(CancelRequest {
            attendee_id: a,
            event_id,
        })
        .await
        .expect("cancelled");

    // The earlier waitlisted entry wins the freed seat, never the later one.
    assert_eq!(receipt.released_status, RegistrationStatus::Registered);
    assert_eq!(receipt.promoted, Some(b_receipt.registration_id));

    let rows = store.snapshot();
    let confirmed: Vec<_> = rows
        .iter()
        .filter(|row| row.status() == RegistrationStatus::Registered)
        .collect();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed.first().map(|row| row.attendee_id()), Some(b));
}

#[tokio::test]
async fn waitlisted_cancellation_never_promotes() {
    let (service, store) = scenario_service(Capacity::Limited(1));
    let event_id = EventId::random();
    let (a, b, c) = (
        AttendeeId::random(),
        AttendeeId::random(),
        AttendeeId::random(),
    );

    register_one(&service, a, event_id).await;
    register_one(&service, b, event_id).await;
    register_one(&service, c, event_id).await;

    let receipt = service
        .cancel(CancelRequest {
            attendee_id: b,
            event_id,
        })
        .await
        .expect("waitlisted cancel succeeds");

    assert_eq!(receipt.released_status, RegistrationStatus::Waitlisted);
    assert_eq!(receipt.promoted, None);
    assert_eq!(
        InMemoryRegistrationStore::confirmed_count(&store.snapshot(), event_id),
        1
    );
}

#[tokio::test]
async fn zero_capacity_waitlists_everyone() {
    let (service, store) = scenario_service(Capacity::Limited(0));
    let event_id = EventId::random();
    let attendee_id = AttendeeId::random();

    let receipt = register_one(&service, attendee_id, event_id).await;
    assert_eq!(receipt.status, RegistrationStatus::Waitlisted);

    let cancel = service
        .cancel(CancelRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect("cancelled");
    assert_eq!(cancel.promoted, None);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn unlimited_capacity_admits_every_registrant() {
    let (service, store) = scenario_service(Capacity::Unlimited);
    let event_id = EventId::random();

    for _ in 0..10 {
        let receipt = register_one(&service, AttendeeId::random(), event_id).await;
        assert_eq!(receipt.status, RegistrationStatus::Registered);
    }
    assert_eq!(
        InMemoryRegistrationStore::confirmed_count(&store.snapshot(), event_id),
        10
    );
}

#[tokio::test]
async fn duplicate_registration_is_rejected_and_not_stored_twice() {
    let (service, store) = scenario_service(Capacity::Limited(5));
    let event_id = EventId::random();
    let attendee_id = AttendeeId::random();

    register_one(&service, attendee_id, event_id).await;
    let error = service
        .register(RegisterRequest {
            attendee_id,
            event_id,
        })
        .await
        .expect_err("second registration rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn second_cancellation_reports_not_registered() {
    let (service, _store) = scenario_service(Capacity::Limited(5));
    let event_id = EventId::random();
    let attendee_id = AttendeeId::random();
    let request = CancelRequest {
        attendee_id,
        event_id,
    };

    register_one(&service, attendee_id, event_id).await;
    service.cancel(request).await.expect("first cancel succeeds");

    let error = service.cancel(request).await.expect_err("nothing left");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn concurrent_registrations_fill_the_last_seat_exactly_once() {
    let (service, store) = scenario_service(Capacity::Limited(1));
    let event_id = EventId::random();
    let (a, b) = (AttendeeId::random(), AttendeeId::random());

    let (first, second) = tokio::join!(
        service.register(RegisterRequest {
            attendee_id: a,
            event_id,
        }),
        service.register(RegisterRequest {
            attendee_id: b,
            event_id,
        }),
    );

    let mut statuses = vec![
        first.expect("first accepted").status,
        second.expect("second accepted").status,
    ];
    statuses.sort_by_key(|status| status.as_str());
    assert_eq!(
        statuses,
        vec![RegistrationStatus::Registered, RegistrationStatus::Waitlisted]
    );
    assert_eq!(
        InMemoryRegistrationStore::confirmed_count(&store.snapshot(), event_id),
        1
    );
}

#[tokio::test]
async fn concurrent_duplicate_registrations_admit_exactly_one() {
    let (service, store) = scenario_service(Capacity::Unlimited);
    let event_id = EventId::random();
    let attendee_id = AttendeeId::random();
    let request = RegisterRequest {
        attendee_id,
        event_id,
    };

    let (first, second) = tokio::join!(service.register(request), service.register(request));

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|error| error.code() == ErrorCode::InvalidRequest));
    assert_eq!(store.snapshot().len(), 1);
}
