//! HTTP content fetcher
//!
//! One GET per call against a [`ContentSource`] URL, no retry and no cache.
//! The body must be JSON; the source template picks the display text out of it.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::application::errors::FetchError;
use crate::domain::entities::ContentSource;
use crate::domain::traits::ContentFetcher;
use crate::infrastructure::config::FetchConfig;

/// reqwest-backed [`ContentFetcher`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, source: &ContentSource) -> Result<String, FetchError> {
        tracing::debug!("GET {}", source.url);

        let response = self.client
            .get(&source.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        source.render(&body)
    }
}
