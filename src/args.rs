use bookmark_watch::Scraper;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookmark-watch")]
#[command(about = "Checks announcement pages for new bookmark links and pushes a notification for each")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of bookmark links taken from each page
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// JSON file holding known links when DATABASE_URL is not set
    #[arg(short, long)]
    pub state_file: Option<PathBuf>,

    /// Seconds to wait between source pages
    #[arg(long)]
    pub source_delay: Option<u64>,

    /// Seconds to wait between notifications
    #[arg(long)]
    pub notify_delay: Option<u64>,

    /// Page fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, mut scraper: Scraper) -> Scraper {
        if let Some(limit) = self.limit {
            scraper = scraper.with_link_limit(limit);
        }
        if let Some(path) = &self.state_file {
            scraper = scraper.with_state_file(path);
        }
        if let Some(seconds) = self.source_delay {
            scraper = scraper.with_source_delay(seconds);
        }
        if let Some(seconds) = self.notify_delay {
            scraper = scraper.with_notify_delay(seconds);
        }
        if let Some(seconds) = self.timeout {
            scraper = scraper.with_fetch_timeout(seconds);
        }
        scraper
    }
}
