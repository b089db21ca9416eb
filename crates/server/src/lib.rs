//! Reference implementation of the marketplace admin REST API.
//!
//! In-memory collections behind JWT bearer auth; the console and its
//! integration tests run against it.

pub mod auth;
pub mod errors;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod store;

pub use startup::{build_app, build_state, run, AppState, API_PREFIX};
