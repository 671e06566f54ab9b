use crate::error::Result;
use async_trait::async_trait;

/// Source of raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its body as text
    async fn fetch(&self, url: &str) -> Result<String>;
}
