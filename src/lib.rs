//! Hotel revenue and remittance monitoring.
//!
//! Synthetic transactions are generated deterministically from a seed, then
//! aggregated into metrics and scanned for under-remittance alerts. The `api`
//! module serves all of it to the dashboard over HTTP.

pub mod api;
pub mod client;
pub mod config;
pub mod core;
pub mod reports;
pub mod signals;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
