//! HTTP implementation of [`ConnectClient`] for the 1Password Connect REST API.
//!
//! All requests go to `{host}/v1` and carry the Connect token as a bearer
//! credential. The token is held in zeroizing memory and never logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::client::{ClientFactory, ConnectClient};
use super::error::{ConnectError, Result};
use super::models::{Item, Vault};

/// Error body returned by Connect for failed requests.
#[derive(Debug, Deserialize)]
struct ConnectErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for a single Connect server and token.
pub struct HttpConnectClient {
    client: Client,
    base_url: String,
    token: Zeroizing<String>,
}

impl std::fmt::Debug for HttpConnectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnectClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl HttpConnectClient {
    /// Create a client for `host` authenticating with `token`.
    ///
    /// A host without a scheme is treated as plain `http://`, which is how
    /// Connect servers are usually reached inside a cluster.
    pub fn new(host: &str, token: &str, timeout: Duration) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ConnectError::InvalidConfig("Connect host is empty".to_string()));
        }

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/v1", host)
        } else {
            format!("http://{}/v1", host)
        };

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConnectError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url, token: Zeroizing::new(token.to_string()) })
    }

    /// Base URL including the `/v1` prefix.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Connect API request");
        self.client.request(method, &url).bearer_auth(self.token.as_str())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        trace!(status = %status, "Connect API response");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ConnectErrorBody>(&text)
            .map(|body| body.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text
                }
            });

        Err(ConnectError::status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|e| ConnectError::Decode(e.to_string()))
    }
}

/// Build a Connect `filter` expression matching an exact attribute value.
fn eq_filter(attribute: &str, value: &str) -> String {
    format!("{} eq \"{}\"", attribute, value.replace('"', "\\\""))
}

#[async_trait]
impl ConnectClient for HttpConnectClient {
    async fn get_vaults(&self) -> Result<Vec<Vault>> {
        self.send_json(self.request(reqwest::Method::GET, "/vaults")).await
    }

    async fn get_vaults_by_title(&self, title: &str) -> Result<Vec<Vault>> {
        let builder = self
            .request(reqwest::Method::GET, "/vaults")
            .query(&[("filter", eq_filter("name", title))]);
        self.send_json(builder).await
    }

    async fn get_items(&self, vault_id: &str) -> Result<Vec<Item>> {
        let path = format!("/vaults/{}/items", vault_id);
        self.send_json(self.request(reqwest::Method::GET, &path)).await
    }

    async fn get_items_by_title(&self, title: &str, vault_id: &str) -> Result<Vec<Item>> {
        let path = format!("/vaults/{}/items", vault_id);
        let builder = self
            .request(reqwest::Method::GET, &path)
            .query(&[("filter", eq_filter("title", title))]);
        self.send_json(builder).await
    }

    async fn get_item(&self, item_id: &str, vault_id: &str) -> Result<Item> {
        let path = format!("/vaults/{}/items/{}", vault_id, item_id);
        self.send_json(self.request(reqwest::Method::GET, &path)).await
    }

    async fn create_item(&self, item: &Item, vault_id: &str) -> Result<Item> {
        let path = format!("/vaults/{}/items", vault_id);
        self.send_json(self.request(reqwest::Method::POST, &path).json(item)).await
    }

    async fn update_item(&self, item: &Item, vault_id: &str) -> Result<Item> {
        let path = format!("/vaults/{}/items/{}", vault_id, item.id);
        self.send_json(self.request(reqwest::Method::PUT, &path).json(item)).await
    }

    async fn delete_item(&self, item: &Item, vault_id: &str) -> Result<()> {
        let path = format!("/vaults/{}/items/{}", vault_id, item.id);
        self.send(self.request(reqwest::Method::DELETE, &path)).await?;
        Ok(())
    }
}

/// Factory producing [`HttpConnectClient`] handles with a shared request timeout.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    timeout: Duration,
}

impl HttpClientFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, host: &str, token: &str) -> Result<Arc<dyn ConnectClient>> {
        let client = HttpConnectClient::new(host, token, self.timeout)?;
        Ok(Arc::new(client))
    }
}
