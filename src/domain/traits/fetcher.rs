use async_trait::async_trait;
use crate::application::errors::FetchError;
use crate::domain::entities::ContentSource;

/// Fetcher trait - one request to an external source, one display string back
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, source: &ContentSource) -> Result<String, FetchError>;
}
