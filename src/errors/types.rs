//! # Error Types
//!
//! Error taxonomy for the 1Password Connect plugin using `thiserror`.

use std::fmt;

use crate::connect::ConnectError;
use crate::storage::StorageError;

/// Custom result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Main error type for the plugin backend
#[derive(thiserror::Error, Debug)]
pub enum PluginError {
    /// No configuration record exists when a client is requested
    #[error("no config set for the 1Password Connect backend")]
    NotConfigured,

    /// Title lookup found nothing, or the upstream service has no such entity
    #[error("{resource} not found: '{identifier}'")]
    NotFound { resource: ResourceKind, identifier: String },

    /// Every default vault source came up empty
    #[error("no vault has been specified")]
    NoVaultSpecified,

    /// Any failure reported by the Connect API, prefixed with the stage it failed in
    #[error("{stage}: {source}")]
    Upstream {
        stage: String,
        #[source]
        source: ConnectError,
    },

    /// Malformed request input
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// Storage collaborator failures
    #[error("Storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },

    /// Serialization/deserialization errors for stored records
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No route matches the request path
    #[error("unsupported path: '{0}'")]
    UnsupportedPath(String),

    /// The route exists but does not handle the operation
    #[error("unsupported operation '{operation}' on path '{path}'")]
    UnsupportedOperation { operation: String, path: String },

    /// Process settings errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Upstream entity kinds named in not-found errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Vault,
    Item,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vault => write!(f, "vault"),
            ResourceKind::Item => write!(f, "item"),
        }
    }
}

impl PluginError {
    /// Create a not found error
    pub fn not_found<I: Into<String>>(resource: ResourceKind, identifier: I) -> Self {
        Self::NotFound { resource, identifier: identifier.into() }
    }

    /// Wrap an upstream failure with the stage it happened in
    pub fn upstream<S: Into<String>>(stage: S, source: ConnectError) -> Self {
        Self::Upstream { stage: stage.into(), source }
    }

    /// Create a validation error for a request field
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a storage error with context
    pub fn storage<S: Into<String>>(context: S, source: StorageError) -> Self {
        Self::Storage { context: context.into(), source }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(context: S, source: serde_json::Error) -> Self {
        Self::Serialization { context: context.into(), source }
    }

    /// Create a settings error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Map an upstream not-found onto the plugin's own not-found, wrap anything else
    pub fn from_lookup<S: Into<String>, I: Into<String>>(
        stage: S,
        resource: ResourceKind,
        identifier: I,
        source: ConnectError,
    ) -> Self {
        match source {
            ConnectError::NotFound { .. } => Self::not_found(resource, identifier),
            other => Self::upstream(stage, other),
        }
    }

    /// Whether this error means the addressed entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, PluginError::NotFound { .. })
    }
}

impl From<validator::ValidationErrors> for PluginError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // nested structs report under their parent field, so name the top-level fields
        let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();

        Self::validation(fields.join(", "), errors.to_string())
    }
}
