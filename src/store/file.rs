use crate::error::{Error, Result};
use crate::results::LinkRecord;
use crate::store::LinkStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Keeps known links as a JSON array in a single file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Raw file contents; `None` when the file is missing or blank
    async fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ::log::info!(
                    "{} not found, a new file will be created",
                    self.path.display()
                );
                Ok(None)
            }
            Err(e) => Err(Error::Store(format!(
                "cannot read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Move an unparsable file out of the way so the next write starts fresh
    async fn set_aside(&self, reason: &serde_json::Error) -> Result<()> {
        let mut target = self.path.clone().into_os_string();
        target.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
        let target = PathBuf::from(target);

        fs::rename(&self.path, &target).await?;
        ::log::error!(
            "Cannot parse {} ({}), moved it to {} and starting a new file",
            self.path.display(),
            reason,
            target.display()
        );
        Ok(())
    }

    /// Replace the file contents, going through a temporary sibling file
    async fn write_records(&self, records: &[LinkRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load_all(&self) -> Result<Vec<LinkRecord>> {
        match self.read_raw().await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::Store(format!("cannot parse {}: {}", self.path.display(), e))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn insert_new(&self, records: &[LinkRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        // A file that no longer parses is kept under another name, never overwritten
        let mut all: Vec<LinkRecord> = match self.read_raw().await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(existing) => existing,
                Err(e) => {
                    self.set_aside(&e).await?;
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut seen: HashSet<String> = all.iter().map(|r| r.url.clone()).collect();
        let now = Utc::now();
        let fresh: Vec<LinkRecord> = records
            .iter()
            .filter(|r| seen.insert(r.url.clone()))
            .map(|r| r.discovered(now))
            .collect();

        let skipped = records.len() - fresh.len();
        if skipped > 0 {
            ::log::warn!("Skipped {} link(s) already present in the state file", skipped);
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        let inserted = fresh.len();
        all.extend(fresh);
        self.write_records(&all).await?;

        ::log::info!(
            "Added {} new bookmark(s) to {}, {} in total",
            inserted,
            self.path.display(),
            all.len()
        );
        Ok(inserted)
    }
}
