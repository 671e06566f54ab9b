//! Watches a fixed set of pages for new `rel="bookmark"` links, records them and
//! pushes a notification for each one.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod notifier;
pub mod parsers;
pub mod results;
pub mod runner;
pub mod store;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use error::{Error, Result};
pub use results::LinkRecord;
pub use runner::{RunReport, Runner};

use std::path::Path;

/// Builder wiring the default fetcher, store and notifier into a [`Runner`]
pub struct Scraper {
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Replace the configuration with one loaded from a JSON file
    ///
    /// Credentials already set on the builder win over those in the file.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let mut config = ScraperConfig::from_file(path)?;
        if let Some(key) = self.config.pushbullet_api_key.take() {
            config.pushbullet_api_key = Some(key);
        }
        if let Some(url) = self.config.database_url.take() {
            config.database_url = Some(url);
        }
        self.config = config;
        Ok(self)
    }

    /// Set the number of bookmark links taken from each page
    pub fn with_link_limit(mut self, limit: usize) -> Self {
        self.config.link_limit = limit;
        self
    }

    /// Set the pause between source pages
    pub fn with_source_delay(mut self, seconds: u64) -> Self {
        self.config.source_delay_secs = seconds;
        self
    }

    /// Set the pause between notifications
    pub fn with_notify_delay(mut self, seconds: u64) -> Self {
        self.config.notify_delay_secs = seconds;
        self
    }

    /// Set the per-page fetch timeout
    pub fn with_fetch_timeout(mut self, seconds: u64) -> Self {
        self.config.fetch_timeout_secs = seconds;
        self
    }

    /// Set the JSON file used when no database is configured
    pub fn with_state_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config.state_file = path.as_ref().to_path_buf();
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Open the store and build the runner
    ///
    /// Fails when the HTTP client cannot be built or a configured database is
    /// unreachable.
    pub async fn build(self) -> Result<Runner> {
        let fetcher = crawlers::HttpFetcher::new(&self.config)?;
        let store = store::open(&self.config).await?;
        let notifier = notifier::PushbulletNotifier::from_config(&self.config);

        Ok(Runner::new(
            &self.config,
            Box::new(fetcher),
            store,
            Box::new(notifier),
        ))
    }
}
