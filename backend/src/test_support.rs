//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and when the
//! `test-support` feature is enabled.

mod clock;
mod in_memory;

pub use clock::MutableClock;
pub use in_memory::{
    InMemoryBrandDirectory, InMemoryConsultationRepository, InMemoryNotificationRepository,
    InMemoryUserDirectory,
};
