//! Persistence of known bookmark links.
//!
//! Two backends implement [`LinkStore`]: a relational table reached through sqlx
//! and a flat JSON file. [`open`] picks one from the configuration at startup.

pub mod file;
pub mod sql;

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::results::LinkRecord;
use async_trait::async_trait;

pub use file::FileStore;
pub use sql::SqlStore;

/// Durable record of every link seen so far
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Short backend name for log output
    fn name(&self) -> &'static str;

    /// Load every known link
    async fn load_all(&self) -> Result<Vec<LinkRecord>>;

    /// Persist links not seen before and return how many were written
    ///
    /// Links whose URL is already stored are skipped without error.
    async fn insert_new(&self, records: &[LinkRecord]) -> Result<usize>;
}

/// Open the backend selected by `config`
///
/// A database URL selects the relational store; otherwise links are kept in the
/// configured state file.
pub async fn open(config: &ScraperConfig) -> Result<Box<dyn LinkStore>> {
    match &config.database_url {
        Some(url) => {
            ::log::info!("Using database store");
            Ok(Box::new(SqlStore::connect(url).await?))
        }
        None => {
            ::log::info!("Using file store at {}", config.state_file.display());
            Ok(Box::new(FileStore::new(&config.state_file)))
        }
    }
}
