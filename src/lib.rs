//! # op-connect-plugin
//!
//! A secrets plugin that proxies item and vault operations to a
//! 1Password Connect server.
//!
//! ## Architecture
//!
//! ```text
//! Host (HTTP adapter) → Backend → ClientCache → ConnectClient → 1Password Connect
//!                          ↓
//!                       Storage (connection config)
//! ```
//!
//! ## Core Components
//!
//! - **Backend**: routes `(operation, path)` requests to handlers and owns
//!   the client cache
//! - **Connect**: the `ConnectClient` capability trait and its reqwest
//!   implementation
//! - **Storage**: key-value persistence for the connection configuration
//! - **API**: axum adapter mapping HTTP verbs onto backend operations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use op_connect_plugin::{
//!     backend::{Backend, Operation, Request},
//!     config::PluginSettings,
//!     connect::HttpClientFactory,
//!     storage::InMemoryStorage,
//!     Result,
//! };
//!
//! # async fn run() -> Result<()> {
//! let settings = PluginSettings::from_env()?;
//! let factory = Arc::new(HttpClientFactory::new(settings.connect.timeout()));
//! let backend = Backend::new(&settings, factory);
//! let storage = InMemoryStorage::new();
//!
//! let vaults = backend.handle_request(&storage, Request::new(Operation::List, "vaults")).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod connect;
pub mod errors;
pub mod observability;
pub mod storage;

pub use backend::Backend;
pub use config::PluginSettings;
pub use errors::{PluginError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
