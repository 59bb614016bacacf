//! Franchise consultation scheduling service.
//!
//! Users request consultations with brands; brand managers confirm them or
//! propose a new schedule; either side may cancel. Every committed status
//! change notifies both parties. The crate is laid out as ports and
//! adapters:
//!
//! - [`domain`]: the consultation state machine, services and ports.
//! - [`inbound`]: actix-web handlers under `/api/v1`.
//! - [`outbound`]: Diesel/PostgreSQL adapters and embedded migrations.

pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
