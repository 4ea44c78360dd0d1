use crate::error::CrawlError;
use crate::store::DirectoryStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tether_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use tether_scanner::{
    CrawlEvent, CrawlSummary, Crawler, DEFAULT_CONCURRENCY, EventCallback, FetchSettings,
    PageOutcome,
};
use url::Url;

pub const DEFAULT_DIRECTORY: &str = "downloaded_pages";

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub directory: PathBuf,
    pub threads: usize,
    pub timeout_secs: u64,
    pub retries: u32,
    pub max_pages: Option<usize>,
    pub archive_duplicates: bool,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            threads: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: 0,
            max_pages: None,
            archive_duplicates: false,
            show_progress_bars: false,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            ..FetchSettings::default()
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl summary
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary, CrawlError> {
    let settings = options.fetch_settings();
    let CrawlOptions {
        url,
        directory,
        threads,
        max_pages,
        archive_duplicates,
        show_progress_bars,
        ..
    } = options;

    let store = Arc::new(DirectoryStore::create(directory)?);

    // Single spinner for the whole crawl (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let crawler = Crawler::with_settings(&url, store, settings)?
        .with_concurrency(threads)
        .with_max_pages(max_pages)
        .with_archive_duplicates(archive_duplicates)
        .with_event_callback(progress_events(progress_bar.clone(), progress_callback));

    let summary = crawler.crawl().await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} URLs visited, {} pages stored",
            summary.visited.len(),
            summary.stored_count()
        ));
    }

    Ok(summary)
}

/// Turns crawler events into spinner updates and progress messages.
fn progress_events(
    progress_bar: Option<ProgressBar>,
    progress_callback: Option<CrawlProgressCallback>,
) -> EventCallback {
    let batch = AtomicUsize::new(0);
    let done = AtomicUsize::new(0);
    let stored = AtomicUsize::new(0);

    Arc::new(move |event: CrawlEvent| match event {
        CrawlEvent::RoundStarted { round, batch_size } => {
            batch.store(batch_size, Ordering::Relaxed);
            done.store(0, Ordering::Relaxed);
            if let Some(ref callback) = progress_callback {
                callback(format!("Round {}: {} page(s) to visit", round, batch_size));
            }
        }
        CrawlEvent::PageFinished { round, record } => {
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if matches!(record.outcome, PageOutcome::Stored { .. }) {
                stored.fetch_add(1, Ordering::Relaxed);
            }
            if let Some(ref pb) = progress_bar {
                pb.set_message(format!(
                    "Round {} [{}/{}] {} | {} stored",
                    round,
                    finished,
                    batch.load(Ordering::Relaxed),
                    extract_url_path(&record.url),
                    stored.load(Ordering::Relaxed)
                ));
            }
        }
        CrawlEvent::RoundFinished {
            round,
            frontier_size,
        } => {
            if let Some(ref callback) = progress_callback {
                callback(format!(
                    "Round {} finished, {} new URL(s) queued",
                    round, frontier_size
                ));
            }
        }
    })
}
