//! # Error Handling
//!
//! Error types for the plugin backend, defined with `thiserror`.
//! Every failure is scoped to the request that produced it.

pub mod types;

pub use types::{PluginError, ResourceKind, Result};
