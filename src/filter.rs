use crate::results::LinkRecord;
use std::collections::HashSet;

/// Set of URLs that have already been recorded
#[derive(Debug, Default, Clone)]
pub struct KnownUrls {
    urls: HashSet<String>,
}

impl KnownUrls {
    /// Build the set from previously persisted records
    pub fn from_records(records: &[LinkRecord]) -> Self {
        Self {
            urls: records.iter().map(|r| r.url.clone()).collect(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Keep the candidates whose URL is not in the set, in their original order
    pub fn filter_new(&self, candidates: &[LinkRecord]) -> Vec<LinkRecord> {
        candidates
            .iter()
            .filter(|candidate| {
                let is_new = !self.contains(&candidate.url);
                if !is_new {
                    ::log::trace!("Already known: {}", candidate.url);
                }
                is_new
            })
            .cloned()
            .collect()
    }
}

/// Returns the candidates whose URL is absent from `known`, preserving candidate order
pub fn new_links(candidates: &[LinkRecord], known: &[LinkRecord]) -> Vec<LinkRecord> {
    KnownUrls::from_records(known).filter_new(candidates)
}

/// Drops repeated URLs, keeping the first occurrence of each
pub fn dedup_by_url(candidates: Vec<LinkRecord>) -> Vec<LinkRecord> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .collect()
}
