//! 1Password Connect API access.
//!
//! The plugin never depends on a concrete HTTP client. It talks to upstream
//! through the [`ConnectClient`] trait and obtains handles from a
//! [`ClientFactory`] injected at backend construction:
//!
//! - [`HttpConnectClient`] / [`HttpClientFactory`]: the real REST client
//! - test doubles implement the same trait in `tests/common`
//!
//! # Example
//!
//! ```rust,ignore
//! use op_connect_plugin::connect::{ClientFactory, HttpClientFactory};
//!
//! let client = HttpClientFactory::default().build("localhost:8080", "token")?;
//! let vaults = client.get_vaults().await?;
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod models;

pub use client::{ClientFactory, ConnectClient};
pub use error::ConnectError;
pub use http::{HttpClientFactory, HttpConnectClient};
pub use models::{
    CharacterSet, FieldPurpose, FieldType, GeneratorRecipe, Item, ItemCategory, ItemField,
    ItemSection, ItemUrl, ItemVault, SectionRef, Vault,
};
