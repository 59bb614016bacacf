//! Server construction and wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{error, info};

use consult_backend::inbound::http::configure_api;
use consult_backend::inbound::http::health::{HealthState, live, ready};
use consult_backend::inbound::http::state::HttpState;
use state_builders::build_http_state;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live)
}

/// Bind the HTTP server and mark it ready.
///
/// Actix's own signal handling is off; pair the server with
/// [`drain_on_shutdown_signal`] so liveness fails before connections drain.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .disable_signals()
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

/// Fail liveness probes, then stop accepting and finish in-flight requests.
async fn drain(health_state: web::Data<HealthState>, handle: ServerHandle) {
    health_state.mark_unhealthy();
    handle.stop(true).await;
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        interrupted = tokio::signal::ctrl_c() => interrupted,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Drain `server` on SIGINT or SIGTERM.
pub fn drain_on_shutdown_signal(server: &Server, health_state: web::Data<HealthState>) {
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                info!("shutdown signal received; draining");
                drain(health_state, handle).await;
            }
            Err(err) => error!(error = %err, "unable to listen for shutdown signals"),
        }
    });
}
