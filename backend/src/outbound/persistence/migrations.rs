//! Embedded schema migrations.
//!
//! The SQL under `backend/migrations` is compiled into the binary so a fresh
//! database can be brought up to date at startup without the Diesel CLI.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;
use tracing::info;

/// Migrations bundled at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while applying embedded migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply all pending embedded migrations to `database_url`.
///
/// Uses a blocking connection; call from `spawn_blocking` inside a runtime.
pub fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|error| MigrationError::Connect {
            message: error.to_string(),
        })?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| MigrationError::Apply {
            message: error.to_string(),
        })?;
    info!(applied = applied.len(), "database migrations applied");
    Ok(applied.len())
}
