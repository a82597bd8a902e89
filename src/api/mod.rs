//! Planillas API Server module
//!
//! HTTP REST API for roster matching and form generation.
//! Run with `planillas-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
