//! OpenAPI documentation configuration.
//!
//! Generates the OpenAPI specification for the REST API, served by Swagger
//! UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::registrations::{
    RegisterEventRequest, RegisterEventResponse, UnregisterEventResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Festora registration API",
        description = "Event registration, capacity, and waitlist coordination."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::registrations::register_event,
        crate::inbound::http::registrations::unregister_event,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterEventRequest,
        RegisterEventResponse,
        UnregisterEventResponse,
    )),
    tags(
        (name = "registrations", description = "Event registration lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
