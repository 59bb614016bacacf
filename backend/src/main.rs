//! Service entry point: loads settings, prepares the database and serves HTTP.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use consult_backend::inbound::http::health::HealthState;
use consult_backend::outbound::persistence::{DbPool, run_migrations};
use server::{ServerConfig, ServerSettings, create_server, drain_on_shutdown_signal};

async fn apply_migrations(database_url: String) -> Result<()> {
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to apply database migrations")?;
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("CONSULT_BIND_ADDR is not a socket address")?;
    let mut config = ServerConfig::new(bind_addr);

    match (settings.pool_config(), settings.database_url.clone()) {
        (Some(pool_config), Some(database_url)) => {
            if settings.run_migrations() {
                apply_migrations(database_url).await?;
            }
            let pool = DbPool::new(pool_config)
                .await
                .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        _ => warn!("no database configured; serving fixture adapters"),
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting consultation service");
    let server = create_server(health_state.clone(), config)?;
    drain_on_shutdown_signal(&server, health_state);
    server.await?;
    Ok(())
}
