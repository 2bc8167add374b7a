//! Registration HTTP handlers.
//!
//! ```text
//! POST /api/v1/register-event
//! DELETE /api/v1/unregister-event/{attendee_id}/{event_id}
//! ```

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CancelRequest, RegisterRequest};
use crate::domain::{AttendeeId, Error, EventId, RegistrationStatus};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

const ATTENDEE_ID_FIELD: FieldName = FieldName::new("attendeeId");
const EVENT_ID_FIELD: FieldName = FieldName::new("eventId");

/// Request payload for registering an attendee.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEventRequest {
    /// The registrant's identifier.
    pub attendee_id: Option<String>,
    /// The target event's identifier.
    pub event_id: Option<String>,
}

/// Response payload for a registration attempt.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEventResponse {
    /// Always `true` for successful responses.
    pub success: bool,
    /// Identifier of the created registration row.
    pub registration_id: String,
    /// `registered` when admitted, `waitlisted` when queued.
    pub status: String,
    /// Human-readable outcome description.
    pub message: String,
}

/// Response payload for a cancellation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterEventResponse {
    /// Always `true` for successful responses.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct UnregisterPath {
    attendee_id: String,
    event_id: String,
}

fn parse_register_request(payload: RegisterEventRequest) -> Result<RegisterRequest, Error> {
    let attendee_id = payload
        .attendee_id
        .ok_or_else(|| missing_field_error(ATTENDEE_ID_FIELD))?;
    let event_id = payload
        .event_id
        .ok_or_else(|| missing_field_error(EVENT_ID_FIELD))?;

    Ok(RegisterRequest {
        attendee_id: AttendeeId::from_uuid(parse_uuid(attendee_id, ATTENDEE_ID_FIELD)?),
        event_id: EventId::from_uuid(parse_uuid(event_id, EVENT_ID_FIELD)?),
    })
}

fn parse_unregister_path(path: UnregisterPath) -> Result<CancelRequest, Error> {
    Ok(CancelRequest {
        attendee_id: AttendeeId::from_uuid(parse_uuid(path.attendee_id, ATTENDEE_ID_FIELD)?),
        event_id: EventId::from_uuid(parse_uuid(path.event_id, EVENT_ID_FIELD)?),
    })
}

const fn registration_message(status: RegistrationStatus) -> &'static str {
    match status {
        RegistrationStatus::Registered => "Successfully registered",
        RegistrationStatus::Waitlisted => "Added to waitlist",
    }
}

/// Register an attendee for an event, admitting or waitlisting by capacity.
#[utoipa::path(
    post,
    path = "/api/v1/register-event",
    request_body = RegisterEventRequest,
    responses(
        (status = 200, description = "Registration recorded", body = RegisterEventResponse),
        (status = 400, description = "Invalid request or already registered", body = Error),
        (status = 404, description = "Event not found", body = Error),
        (status = 503, description = "Registration temporarily unavailable", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "registerEvent"
)]
#[post("/register-event")]
pub async fn register_event(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterEventRequest>,
) -> ApiResult<web::Json<RegisterEventResponse>> {
    let request = parse_register_request(payload.into_inner())?;
    let receipt = state.registrations.register(request).await?;

    Ok(web::Json(RegisterEventResponse {
        success: true,
        registration_id: receipt.registration_id.to_string(),
        status: receipt.status.to_string(),
        message: registration_message(receipt.status).to_owned(),
    }))
}

/// Cancel an attendee's registration, promoting a waitlisted successor when a
/// confirmed seat frees up.
#[utoipa::path(
    delete,
    path = "/api/v1/unregister-event/{attendee_id}/{event_id}",
    params(
        ("attendee_id" = String, Path, description = "Attendee identifier"),
        ("event_id" = String, Path, description = "Event identifier")
    ),
    responses(
        (status = 200, description = "Registration cancelled", body = UnregisterEventResponse),
        (status = 400, description = "Invalid identifiers", body = Error),
        (status = 404, description = "No active registration", body = Error),
        (status = 503, description = "Registration temporarily unavailable", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "unregisterEvent"
)]
#[delete("/unregister-event/{attendee_id}/{event_id}")]
pub async fn unregister_event(
    state: web::Data<HttpState>,
    path: web::Path<UnregisterPath>,
) -> ApiResult<web::Json<UnregisterEventResponse>> {
    let request = parse_unregister_path(path.into_inner())?;
    state.registrations.cancel(request).await?;

    Ok(web::Json(UnregisterEventResponse {
        success: true,
        message: "Successfully unregistered".to_owned(),
    }))
}

#[cfg(test)]
#[path = "registrations_tests.rs"]
mod tests;
