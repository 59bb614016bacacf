//! Server settings loaded via OrthoConfig, and the built server configuration.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use consult_backend::outbound::persistence::{DbPool, PoolConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Settings layered from CLI flags, `CONSULT_*` variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONSULT")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server runs on fixture adapters.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving. Defaults to on.
    pub run_migrations: Option<bool>,
}

impl ServerSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Whether startup applies embedded migrations.
    #[must_use]
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Pool configuration, when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        Some(
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
                .with_connection_timeout(Duration::from_secs(
                    self.connection_timeout_secs
                        .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
                )),
        )
    }
}

/// Everything `create_server` needs once startup I/O is done.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
        }
    }

    /// Use database-backed adapters instead of fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
