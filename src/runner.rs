use crate::config::ScraperConfig;
use crate::crawlers::PageFetcher;
use crate::filter::{dedup_by_url, new_links};
use crate::notifier::Notifier;
use crate::parsers::extract_bookmarks;
use crate::results::{LinkRecord, Summary};
use crate::store::LinkStore;
use std::time::Duration;
use url::Url;

/// Counters describing one completed run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Source pages visited
    pub sources: usize,
    /// Source pages that could not be fetched
    pub failed_sources: usize,
    /// Bookmark links extracted across all sources
    pub candidates: usize,
    /// Links not seen in any earlier run
    pub new_links: usize,
    /// Links written by the store
    pub inserted: usize,
    /// Notifications accepted by the push service
    pub notified: usize,
    /// Links known after the run
    pub total_known: usize,
}

/// Drives one check of every source page
pub struct Runner {
    pub(crate) sources: Vec<String>,
    link_limit: usize,
    source_delay: Duration,
    notify_delay: Duration,
    fetcher: Box<dyn PageFetcher>,
    store: Box<dyn LinkStore>,
    notifier: Box<dyn Notifier>,
}

impl Runner {
    pub fn new(
        config: &ScraperConfig,
        fetcher: Box<dyn PageFetcher>,
        store: Box<dyn LinkStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            sources: config.sources().iter().map(|s| s.to_string()).collect(),
            link_limit: config.link_limit,
            source_delay: config.source_delay(),
            notify_delay: config.notify_delay(),
            fetcher,
            store,
            notifier,
        }
    }

    /// Load known links, check every source, record and announce new links
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport {
            sources: self.sources.len(),
            ..RunReport::default()
        };

        let known = self.load_known().await;
        println!("\nKnown bookmarks: {}", known.len());

        let candidates = self.collect_candidates(&mut report).await;
        report.candidates = candidates.len();

        let fresh = new_links(&dedup_by_url(candidates), &known);
        report.new_links = fresh.len();

        println!("\nLinks found in this check: {}", report.candidates);
        println!("New bookmarks: {}", report.new_links);

        if fresh.is_empty() {
            println!("\nNo new bookmarks found. All links are already known.");
        } else {
            report.inserted = self.persist(&fresh).await;
            report.notified = self.announce(&fresh).await;
            print_new_links(&fresh);
        }

        let summary = Summary::from_records(&self.load_known().await);
        report.total_known = summary.total();
        println!("\n{}", summary);

        ::log::info!(
            "Run finished: {} candidate(s), {} new, {} inserted, {} notified, {} of {} source(s) failed",
            report.candidates,
            report.new_links,
            report.inserted,
            report.notified,
            report.failed_sources,
            report.sources
        );
        report
    }

    /// Known links, or none when the store cannot be read
    async fn load_known(&self) -> Vec<LinkRecord> {
        match self.store.load_all().await {
            Ok(records) => records,
            Err(e) => {
                ::log::error!(
                    "Failed to load known links from {} store, treating as empty: {}",
                    self.store.name(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn collect_candidates(&self, report: &mut RunReport) -> Vec<LinkRecord> {
        let mut candidates = Vec::new();

        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 && !self.source_delay.is_zero() {
                tokio::time::sleep(self.source_delay).await;
            }

            match self.scrape_source(source).await {
                Some(links) => candidates.extend(links),
                None => report.failed_sources += 1,
            }
        }

        candidates
    }

    /// Fetch and extract one source; `None` when the page could not be loaded
    async fn scrape_source(&self, source: &str) -> Option<Vec<LinkRecord>> {
        println!("\n{}", "=".repeat(60));
        println!("Scraping: {}", source);
        println!("{}", "=".repeat(60));

        let base_url = match Url::parse(source) {
            Ok(url) => url,
            Err(e) => {
                ::log::error!("Invalid source URL {}: {}", source, e);
                return None;
            }
        };

        let html = match self.fetcher.fetch(source).await {
            Ok(html) => html,
            Err(e) => {
                ::log::error!("{}", e);
                println!("Could not load page: {}", source);
                return None;
            }
        };

        let links = extract_bookmarks(&html, &base_url, self.link_limit);
        println!("Bookmark links found: {}", links.len());
        for (i, link) in links.iter().enumerate() {
            println!("{:2}. {}", i + 1, link.text);
            println!("    URL: {}", link.url);
            if !link.title.is_empty() {
                println!("    Title: {}", link.title);
            }
        }

        Some(links)
    }

    /// Write new links; failures are logged and the run carries on
    async fn persist(&self, fresh: &[LinkRecord]) -> usize {
        match self.store.insert_new(fresh).await {
            Ok(inserted) => inserted,
            Err(e) => {
                ::log::error!(
                    "Failed to save {} new link(s) to {} store: {}",
                    fresh.len(),
                    self.store.name(),
                    e
                );
                0
            }
        }
    }

    /// Notify each new link in order, pausing between sends
    async fn announce(&self, fresh: &[LinkRecord]) -> usize {
        ::log::info!("Sending notifications for {} new bookmark(s)", fresh.len());

        let mut sent = 0;
        for (i, link) in fresh.iter().enumerate() {
            if i > 0 && !self.notify_delay.is_zero() {
                tokio::time::sleep(self.notify_delay).await;
            }
            if self.notifier.notify(link).await.is_sent() {
                sent += 1;
            }
        }
        sent
    }
}

fn print_new_links(fresh: &[LinkRecord]) {
    println!("\n{}", "=".repeat(60));
    println!("NEW BOOKMARKS");
    println!("{}", "=".repeat(60));
    for (i, link) in fresh.iter().enumerate() {
        println!("{:2}. {}", i + 1, link.text);
        println!("    URL: {}", link.url);
        println!("    Source: {}", link.source_url);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::notifier::Delivery;
    use crate::store::FileStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Serves canned pages; unknown URLs fail like an unreachable host
    struct StaticFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages.get(url).cloned().ok_or_else(|| Error::Fetch {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, record: &LinkRecord) -> Delivery {
            self.sent.lock().unwrap().push(record.url.clone());
            Delivery::Sent
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl LinkStore for BrokenStore {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn load_all(&self) -> Result<Vec<LinkRecord>> {
            Err(Error::Store("disk on fire".to_string()))
        }

        async fn insert_new(&self, _records: &[LinkRecord]) -> Result<usize> {
            Err(Error::Store("disk on fire".to_string()))
        }
    }

    fn page(hrefs: &[&str]) -> String {
        hrefs
            .iter()
            .map(|h| format!(r#"<a rel="bookmark" href="{h}">Item {h}</a>"#))
            .collect()
    }

    fn quiet_config() -> ScraperConfig {
        ScraperConfig {
            source_delay_secs: 0,
            notify_delay_secs: 0,
            ..ScraperConfig::default()
        }
    }

    fn runner(
        pages: &[(&str, String)],
        store: Box<dyn LinkStore>,
        notifier: RecordingNotifier,
    ) -> Runner {
        let fetcher = StaticFetcher {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.clone()))
                .collect(),
        };
        let mut runner = Runner::new(&quiet_config(), Box::new(fetcher), store, Box::new(notifier));
        runner.sources = vec!["https://a.test/".to_string(), "https://b.test/".to_string()];
        runner
    }

    fn file_store(dir: &Path) -> Box<dyn LinkStore> {
        Box::new(FileStore::new(dir.join("links.json")))
    }

    #[tokio::test]
    async fn test_first_run_records_and_notifies_everything() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = RecordingNotifier::default();
        let pages = [
            ("https://a.test/", page(&["/1", "/2"])),
            ("https://b.test/", page(&["/3"])),
        ];

        let report = runner(&pages, file_store(dir.path()), notifier.clone()).run().await;

        assert_eq!(report.candidates, 3);
        assert_eq!(report.new_links, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.notified, 3);
        assert_eq!(report.total_known, 3);
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["https://a.test/1", "https://a.test/2", "https://b.test/3"]
        );
    }

    #[tokio::test]
    async fn test_second_run_over_unchanged_pages_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pages = [
            ("https://a.test/", page(&["/1", "/2"])),
            ("https://b.test/", page(&["/3"])),
        ];
        runner(&pages, file_store(dir.path()), RecordingNotifier::default())
            .run()
            .await;

        let notifier = RecordingNotifier::default();
        let report = runner(&pages, file_store(dir.path()), notifier.clone()).run().await;

        assert_eq!(report.candidates, 3);
        assert_eq!(report.new_links, 0);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.total_known, 3);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_new_links_are_announced() {
        let dir = tempfile::tempdir().unwrap();
        runner(
            &[("https://a.test/", page(&["/1"]))],
            file_store(dir.path()),
            RecordingNotifier::default(),
        )
        .run()
        .await;

        let notifier = RecordingNotifier::default();
        let report = runner(
            &[("https://a.test/", page(&["/new", "/1"]))],
            file_store(dir.path()),
            notifier.clone(),
        )
        .run()
        .await;

        assert_eq!(report.new_links, 1);
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["https://a.test/new"]);
        assert_eq!(report.total_known, 2);
    }

    #[tokio::test]
    async fn test_failed_source_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let pages = [("https://b.test/", page(&["/3"]))];

        let report = runner(&pages, file_store(dir.path()), RecordingNotifier::default())
            .run()
            .await;

        assert_eq!(report.sources, 2);
        assert_eq!(report.failed_sources, 1);
        assert_eq!(report.new_links, 1);
        assert_eq!(report.total_known, 1);
    }

    #[tokio::test]
    async fn test_link_on_two_sources_is_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = RecordingNotifier::default();
        let shared = "https://shared.test/post";
        let pages = [
            ("https://a.test/", page(&[shared])),
            ("https://b.test/", page(&[shared])),
        ];

        let report = runner(&pages, file_store(dir.path()), notifier.clone()).run().await;

        assert_eq!(report.candidates, 2);
        assert_eq!(report.new_links, 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_store_still_notifies() {
        let notifier = RecordingNotifier::default();
        let pages = [("https://a.test/", page(&["/1"]))];

        let report = runner(&pages, Box::new(BrokenStore), notifier.clone()).run().await;

        assert_eq!(report.new_links, 1);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.notified, 1);
        assert_eq!(report.total_known, 0);
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_replaced_and_links_announced_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("links.json"), "{not json").unwrap();
        let notifier = RecordingNotifier::default();
        let pages = [("https://a.test/", page(&["/1"]))];

        let first = runner(&pages, file_store(dir.path()), notifier.clone()).run().await;
        assert_eq!(first.new_links, 1);
        assert_eq!(first.inserted, 1);
        assert_eq!(first.total_known, 1);

        for _ in 0..2 {
            let report = runner(&pages, file_store(dir.path()), notifier.clone()).run().await;
            assert_eq!(report.new_links, 0);
        }

        assert_eq!(*notifier.sent.lock().unwrap(), vec!["https://a.test/1"]);
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_counts_nothing_sent() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher {
            pages: HashMap::from([("https://a.test/".to_string(), page(&["/1"]))]),
        };
        let notifier = crate::notifier::PushbulletNotifier::new(None, "t");
        let mut runner = Runner::new(
            &quiet_config(),
            Box::new(fetcher),
            file_store(dir.path()),
            Box::new(notifier),
        );
        runner.sources = vec!["https://a.test/".to_string()];

        let report = runner.run().await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.notified, 0);
    }
}
