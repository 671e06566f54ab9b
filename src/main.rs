use bookmark_watch::{Scraper, ScraperConfig};
use clap::Parser;
use std::future::Future;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let scraper = match load_scraper(&args) {
        Ok(scraper) => scraper,
        Err(e) => {
            ::log::error!("Unexpected error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = scraper.config();
    println!("Bookmark watcher starting...");
    println!("Collecting rel=\"bookmark\" links from:");
    for source in config.sources() {
        println!("  - {}", source);
    }
    println!(
        "Only the first {} link(s) of each page are checked and only new links are recorded.",
        config.link_limit
    );
    if !config.has_notifications() {
        println!("Push notifications are disabled for this run.");
    }

    let runner = match scraper.build().await {
        Ok(runner) => runner,
        Err(e) => {
            ::log::error!("Unexpected error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        report = runner.run() => {
            println!("\nScraping complete! {} bookmark(s) known.", report.total_known);
            ExitCode::SUCCESS
        }
        _ = interrupted(tokio::signal::ctrl_c()) => {
            println!("\nScraping stopped by user.");
            ExitCode::SUCCESS
        }
    }
}

/// Defaults or the config file, with environment credentials on top, then flags
fn load_scraper(args: &Args) -> bookmark_watch::Result<Scraper> {
    let mut scraper = Scraper::new(ScraperConfig::default().with_env());
    if let Some(path) = &args.config {
        ::log::info!("Loading configuration from {}", path.display());
        scraper = scraper.with_config_file(path)?;
    }
    Ok(args.apply(scraper))
}

/// Resolves once the interrupt signal arrives; never resolves if it cannot be watched
async fn interrupted(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        ::log::warn!("Cannot listen for Ctrl-C, interruption is disabled: {}", e);
        std::future::pending::<()>().await;
    }
}
