//! # Observability Infrastructure
//!
//! Structured logging for the plugin. Spans are created with
//! [`operation_span!`](crate::operation_span) around every host request.

pub mod logging;

pub use logging::{init_logging, log_config_info};
