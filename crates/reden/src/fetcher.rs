use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use crate::config::CrawlConfig;

/// Source of raw HTML. The crawler only ever talks to the network through this.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "text/html")
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{} returned HTTP {}", url, status);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body of {}", url))?;
        tracing::debug!(url = %url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
