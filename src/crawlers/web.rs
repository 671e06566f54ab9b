use crate::config::ScraperConfig;
use crate::crawlers::PageFetcher;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

/// Fetches pages over HTTP with a bounded wait
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the run configuration
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Self::with_settings(&config.user_agent, config.fetch_timeout())
    }

    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        ::log::info!("Loading page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        // Pages are decoded as UTF-8 regardless of the declared charset
        let body = response.bytes().await.map_err(|e| fetch_error(url, &e))?;
        let html = String::from_utf8_lossy(&body).into_owned();

        ::log::debug!(
            "Fetched {} ({} bytes) in {:.2} seconds",
            url,
            html.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(html)
    }
}

fn fetch_error(url: &str, error: &reqwest::Error) -> Error {
    let reason = if error.is_timeout() {
        "timed out".to_string()
    } else {
        error.to_string()
    };
    Error::Fetch {
        url: url.to_string(),
        reason,
    }
}
