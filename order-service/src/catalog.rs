//! Remote catalog probe
//!
//! Product existence is owned by the catalog service; the order service
//! only probes it. A 200 response confirms existence, any other status is a
//! confirmed absence, and a transport fault is a distinguishable error:
//! the caller decides whether to fail the request, never to silently treat
//! an unreachable catalog as "not found".

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("catalog service unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// `Ok(true)` confirmed exists, `Ok(false)` confirmed absent,
    /// `Err` transport fault
    async fn product_exists(&self, product_id: i64) -> Result<bool, ProbeError>;
}

/// HTTP probe against the catalog service
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    async fn product_exists(&self, product_id: i64) -> Result<bool, ProbeError> {
        let url = format!("{}/product/{product_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let exists = response.status().is_success();
        if !exists {
            tracing::debug!(product_id, status = %response.status(), "catalog reported absent");
        }
        Ok(exists)
    }
}
