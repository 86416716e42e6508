//! # Configuration Management
//!
//! Process settings are read from `OP_PLUGIN_*` environment variables and
//! validated with the `validator` crate. The binary layers command line
//! flags on top.
//!
//! The connection record (Connect token, host, default vault) is not process
//! configuration; it lives in plugin storage, see [`crate::backend::config_store`].

pub mod settings;

pub use settings::{
    CacheSettings, ConnectSettings, ObservabilityConfig, PluginSettings, ServerConfig,
    StorageSettings, ENV_PREFIX,
};
