use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use moderator_core::catalog_match::Catalog;

use super::github_api_client::truncate_for_error;

#[async_trait]
/// Trait contract for the external catalog source.
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self, url: &str) -> Result<Catalog>;
}

#[derive(Clone)]
/// Fetches the catalog JSON over plain HTTP(S), one attempt per call.
pub struct HttpCatalogClient {
    http: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(request_timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("issue-moderator")
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create catalog http client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_catalog(&self, url: &str) -> Result<Catalog> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("catalog request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "catalog fetch failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 200)
            );
        }
        response
            .json::<Catalog>()
            .await
            .with_context(|| format!("failed to decode catalog from {url}"))
    }
}
