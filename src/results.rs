use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of sample entries shown per source in a [`Summary`]
pub const SUMMARY_SAMPLES: usize = 3;

/// A bookmark link discovered on a source page
///
/// `url` is the identity of a record: two records with the same `url` are the
/// same link even when their text or title differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute URL of the link
    pub url: String,

    /// Visible anchor text
    #[serde(default)]
    pub text: String,

    /// Anchor `title` attribute, empty when absent
    #[serde(default)]
    pub title: String,

    /// Page the link was extracted from
    #[serde(rename = "base_url")]
    pub source_url: String,

    /// Set when the record is first persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl LinkRecord {
    /// Create a record that has not been persisted yet
    pub fn new(
        url: impl Into<String>,
        text: impl Into<String>,
        title: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            title: title.into(),
            source_url: source_url.into(),
            discovered_at: None,
        }
    }

    /// Copy of this record stamped with a discovery time
    pub fn discovered(&self, at: DateTime<Utc>) -> Self {
        Self {
            discovered_at: Some(at),
            ..self.clone()
        }
    }
}

/// Known links grouped by the page they came from, in first-seen order
#[derive(Debug, Default)]
pub struct Summary {
    groups: Vec<(String, Vec<String>)>,
    total: usize,
}

impl Summary {
    pub fn from_records(records: &[LinkRecord]) -> Self {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for record in records {
            match groups.iter_mut().find(|(source, _)| *source == record.source_url) {
                Some((_, texts)) => texts.push(record.text.clone()),
                None => groups.push((record.source_url.clone(), vec![record.text.clone()])),
            }
        }

        Self {
            groups,
            total: records.len(),
        }
    }

    /// Total number of links across all sources
    pub fn total(&self) -> usize {
        self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Total bookmark links: {}", self.total)?;

        for (source, texts) in &self.groups {
            writeln!(f)?;
            writeln!(f, "{}: {} link(s)", source, texts.len())?;
            for text in texts.iter().take(SUMMARY_SAMPLES) {
                writeln!(f, "  - {}", text)?;
            }
            if texts.len() > SUMMARY_SAMPLES {
                writeln!(f, "  ... and {} more", texts.len() - SUMMARY_SAMPLES)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_source_as_base_url() {
        let record = LinkRecord::new("https://x/a", "A", "", "https://x/");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["base_url"], "https://x/");
        assert!(json.get("source_url").is_none());
        assert!(json.get("discovered_at").is_none());
    }

    #[test]
    fn test_deserializes_records_without_timestamp() {
        let json = r#"{"url": "https://x/a", "text": "Duyuru", "title": "", "base_url": "https://x/"}"#;
        let record: LinkRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.url, "https://x/a");
        assert_eq!(record.text, "Duyuru");
        assert_eq!(record.discovered_at, None);
    }

    #[test]
    fn test_summary_groups_by_source_in_first_seen_order() {
        let records = vec![
            LinkRecord::new("https://b/1", "b1", "", "https://b/"),
            LinkRecord::new("https://a/1", "a1", "", "https://a/"),
            LinkRecord::new("https://b/2", "b2", "", "https://b/"),
        ];
        let summary = Summary::from_records(&records);
        assert_eq!(summary.total(), 3);

        let rendered = summary.to_string();
        let b = rendered.find("https://b/: 2 link(s)").unwrap();
        let a = rendered.find("https://a/: 1 link(s)").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_summary_display_truncates_samples() {
        let records: Vec<LinkRecord> = (1..=5)
            .map(|i| LinkRecord::new(format!("https://x/{i}"), format!("item {i}"), "", "https://x/"))
            .collect();
        let rendered = Summary::from_records(&records).to_string();

        assert!(rendered.contains("Total bookmark links: 5"));
        assert!(rendered.contains("https://x/: 5 link(s)"));
        assert!(rendered.contains("  - item 3"));
        assert!(!rendered.contains("  - item 4"));
        assert!(rendered.contains("... and 2 more"));
    }
}
