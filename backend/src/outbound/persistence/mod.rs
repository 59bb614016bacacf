//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Adapters translate between Diesel rows and domain types and hold no
//! lifecycle rules of their own. Row structs and the `table!` schema stay
//! private to this module. Connections come from a shared `bb8` pool via
//! `diesel-async`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use consult_backend::outbound::persistence::{
//!     DbPool, DieselConsultationRepository, PoolConfig,
//! };
//!
//! # async fn wire() -> Result<(), consult_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/consult")).await?;
//! let consultations = Arc::new(DieselConsultationRepository::new(pool));
//! # let _ = consultations;
//! # Ok(())
//! # }
//! ```

mod diesel_consultation_repository;
mod diesel_directories;
mod diesel_error_mapping;
mod diesel_notification_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_consultation_repository::DieselConsultationRepository;
pub use diesel_directories::{DieselBrandDirectory, DieselUserDirectory};
pub use diesel_notification_repository::DieselNotificationRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
