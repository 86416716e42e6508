//! # REST API
//!
//! Thin axum adapter exposing the backend over HTTP. Verbs map onto backend
//! operations; successful bodies are wrapped as `{"data": ...}` and empty
//! results return `204 No Content`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
