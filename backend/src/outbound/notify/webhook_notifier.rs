//! Webhook-backed [`RegistrationNotifier`] implementation.
//!
//! The platform's notification sender (email, push) sits behind an internal
//! HTTP endpoint; this adapter posts a small JSON envelope to it. Delivery
//! is best-effort by contract: the coordinator logs and drops any failure
//! surfaced here.

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::domain::ports::{NotificationError, RegistrationNotifier};
use crate::domain::{AttendeeId, EventId};

/// Notifier that posts confirmation envelopes to a webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl WebhookNotifier {
    /// Create a notifier targeting the given endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    fn envelope(attendee_id: AttendeeId, event_id: EventId) -> serde_json::Value {
        json!({
            "kind": "registration_confirmed",
            "attendeeId": attendee_id,
            "eventId": event_id,
        })
    }
}

#[async_trait]
impl RegistrationNotifier for WebhookNotifier {
    async fn registration_confirmed(
        &self,
        attendee_id: AttendeeId,
        event_id: EventId,
    ) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&Self::envelope(attendee_id, event_id))
            .send()
            .await
            .map_err(|err| NotificationError::delivery(err.to_string()))?;

        response
            .error_for_status()
            .map(|_| ())
            .map_err(|err| NotificationError::delivery(err.to_string()))
    }
}
