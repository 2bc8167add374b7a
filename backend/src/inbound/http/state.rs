//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain's driving port and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::RegistrationCommand;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Use-case entry point for registration and cancellation.
    pub registrations: Arc<dyn RegistrationCommand>,
}

impl HttpState {
    /// Construct state over a registration use-case implementation.
    pub fn new(registrations: Arc<dyn RegistrationCommand>) -> Self {
        Self { registrations }
    }
}
