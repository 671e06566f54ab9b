use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pages checked on every run, in order
pub const DEFAULT_SOURCES: [&str; 3] = [
    "https://www.deu.edu.tr/tum-duyurular/",
    "https://csc.deu.edu.tr/tr/",
    "https://fen.deu.edu.tr/tr/",
];

/// Environment variable holding the Pushbullet access token
pub const PUSHBULLET_API_KEY_ENV: &str = "PUSHBULLET_API_KEY";

/// Environment variable holding the database connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Configuration for a bookmark watch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Maximum number of bookmark links taken from each page
    #[serde(default = "default_link_limit")]
    pub link_limit: usize,

    /// Pause between two source pages, in seconds
    #[serde(default = "default_source_delay_secs")]
    pub source_delay_secs: u64,

    /// Pause between two notifications, in seconds
    #[serde(default = "default_notify_delay_secs")]
    pub notify_delay_secs: u64,

    /// Upper bound on a single page fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// JSON file used when no database is configured
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Title of every push notification
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// User-Agent sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pushbullet access token; notifications are skipped without it
    #[serde(default, skip_serializing)]
    pub pushbullet_api_key: Option<String>,

    /// Database connection string; the state file is used without it
    #[serde(default, skip_serializing)]
    pub database_url: Option<String>,
}

fn default_link_limit() -> usize {
    crate::parsers::DEFAULT_LINK_LIMIT
}

fn default_source_delay_secs() -> u64 {
    2
}

fn default_notify_delay_secs() -> u64 {
    1
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_state_file() -> PathBuf {
    PathBuf::from("deu_bookmark_links.json")
}

fn default_notification_title() -> String {
    "🔖 New DEU announcement".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            link_limit: default_link_limit(),
            source_delay_secs: default_source_delay_secs(),
            notify_delay_secs: default_notify_delay_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            state_file: default_state_file(),
            notification_title: default_notification_title(),
            user_agent: default_user_agent(),
            pushbullet_api_key: None,
            database_url: None,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill credentials from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Fill credentials through `lookup`; blank values count as unset
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = non_blank(lookup(PUSHBULLET_API_KEY_ENV)) {
            self.pushbullet_api_key = Some(key);
        }
        if let Some(url) = non_blank(lookup(DATABASE_URL_ENV)) {
            self.database_url = Some(url);
        }
        self
    }

    /// Source pages in the order they are checked
    pub fn sources(&self) -> &'static [&'static str] {
        &DEFAULT_SOURCES
    }

    pub fn source_delay(&self) -> Duration {
        Duration::from_secs(self.source_delay_secs)
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_secs(self.notify_delay_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Whether push notifications can be delivered
    pub fn has_notifications(&self) -> bool {
        self.pushbullet_api_key.is_some()
    }
}

/// Treats empty or whitespace-only strings as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
