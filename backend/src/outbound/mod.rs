//! Outbound adapters implementing the driven ports against infrastructure.
//!
//! Only PostgreSQL is supported today; see [`persistence`].

pub mod persistence;
