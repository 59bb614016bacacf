//! Inbound adapters translating external requests into driving port calls.
//!
//! Only HTTP is exposed; see [`http`].

pub mod http;
