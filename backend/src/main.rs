//! Backend entry-point: wires the registration service, REST endpoints, and
//! OpenAPI docs.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::domain::ports::{NoopRegistrationNotifier, RegistrationCommand};
use backend::domain::RegistrationService;
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::registrations::{register_event, unregister_event};
use backend::inbound::http::state::HttpState;
use backend::outbound::notify::WebhookNotifier;
use backend::outbound::persistence::{
    run_pending_migrations, DbPool, DieselEventCatalog, DieselRegistrationStore, PoolConfig,
};
use backend::server::ServerConfig;
#[cfg(debug_assertions)]
use backend::ApiDoc;

fn build_registration_command(config: &ServerConfig, pool: DbPool) -> Arc<dyn RegistrationCommand> {
    let store = Arc::new(DieselRegistrationStore::new(pool.clone()));
    let catalog = Arc::new(DieselEventCatalog::new(pool));

    match config.confirmation_webhook_url.clone() {
        Some(endpoint) => Arc::new(RegistrationService::new(
            store,
            catalog,
            Arc::new(WebhookNotifier::new(endpoint)),
        )),
        None => {
            warn!("CONFIRMATION_WEBHOOK_URL unset, confirmation notifications disabled");
            Arc::new(RegistrationService::new(
                store,
                catalog,
                Arc::new(NoopRegistrationNotifier),
            ))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    run_pending_migrations(config.database_url.clone())
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(
        PoolConfig::new(config.database_url.clone()).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(std::io::Error::other)?;

    let state = HttpState::new(build_registration_command(&config, pool));

    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .service(register_event)
            .service(unregister_event);

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(web::Data::new(state.clone()))
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?;

    info!(bind_addr = %config.bind_addr, "registration server listening");
    health_state.mark_ready();
    server.run().await
}
