use crate::error::{Result, ScanError};
use crate::fetch::{FailureKind, FetchSettings, PageFetcher};
use crate::frontier::{Frontier, Origin};
use crate::ledger::{ContentHash, DedupLedger};
use crate::links::extract_links;
use crate::result::{CrawlEvent, CrawlSummary, PageOutcome, PageRecord};
use crate::store::PageStore;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

pub type EventCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Everything the round tasks read and write. Only ever touched under the
/// crawler's mutex.
struct CrawlState {
    ledger: DedupLedger,
    frontier: Frontier,
}

/// Round-based breadth-first crawler confined to the seed's origin.
///
/// Each round snapshots the frontier, reserves the batch in the ledger,
/// fetches it with at most `concurrency` requests in flight, and waits for
/// the whole batch before the next round starts.
pub struct Crawler {
    seed: Url,
    origin: Origin,
    fetcher: PageFetcher,
    store: Arc<dyn PageStore>,
    state: Mutex<CrawlState>,
    concurrency: usize,
    archive_duplicates: bool,
    event_callback: Option<EventCallback>,
}

impl Crawler {
    pub fn new(seed: &str, store: Arc<dyn PageStore>) -> Result<Self> {
        Self::with_settings(seed, store, FetchSettings::default())
    }

    pub fn with_settings(
        seed: &str,
        store: Arc<dyn PageStore>,
        settings: FetchSettings,
    ) -> Result<Self> {
        let seed = parse_seed(seed)?;
        let origin = Origin::of(&seed)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no crawlable origin", seed)))?;
        let fetcher = PageFetcher::new(settings)?;
        let frontier = Frontier::new(origin.clone(), &seed);

        info!("Crawler initialized with start URL: {}", seed);

        Ok(Self {
            seed,
            origin,
            fetcher,
            store,
            state: Mutex::new(CrawlState {
                ledger: DedupLedger::new(),
                frontier,
            }),
            concurrency: DEFAULT_CONCURRENCY,
            archive_duplicates: false,
            event_callback: None,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Store every fetched HTML page, duplicates included.
    pub fn with_archive_duplicates(mut self, archive: bool) -> Self {
        self.archive_duplicates = archive;
        self
    }

    pub fn with_max_pages(mut self, limit: Option<usize>) -> Self {
        self.state.get_mut().frontier.set_max_pages(limit);
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs rounds until a round's batch is empty.
    pub async fn crawl(&self) -> CrawlSummary {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            "Starting crawl of {} (origin {}, {} concurrent fetches)",
            self.seed, self.origin, self.concurrency
        );

        let mut pages = Vec::new();
        let mut round = 0;

        loop {
            let batch = {
                let mut state = self.state.lock().await;
                let snapshot = state.frontier.take_batch();
                state.ledger.reserve_batch(snapshot)
            };
            if batch.is_empty() {
                break;
            }

            round += 1;
            info!("Round {}: visiting {} page(s)", round, batch.len());
            self.emit(CrawlEvent::RoundStarted {
                round,
                batch_size: batch.len(),
            });

            let records: Vec<PageRecord> = stream::iter(batch)
                .map(|url| self.visit(url, round))
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            let frontier_size = self.state.lock().await.frontier.len();
            debug!(
                "Round {} finished: {} page(s), {} queued for next round",
                round,
                records.len(),
                frontier_size
            );
            self.emit(CrawlEvent::RoundFinished {
                round,
                frontier_size,
            });
            pages.extend(records);
        }

        let (visited, distinct_hashes) = {
            let state = self.state.lock().await;
            (state.ledger.visited_urls(), state.ledger.hash_len())
        };
        info!(
            "Crawling process completed: {} round(s), {} URL(s) visited",
            round,
            visited.len()
        );

        CrawlSummary {
            seed: self.seed.to_string(),
            origin: self.origin.to_string(),
            rounds: round,
            pages,
            visited,
            distinct_hashes,
            started_at,
            finished_at: Utc::now(),
            elapsed: clock.elapsed(),
        }
    }

    pub async fn visited_urls(&self) -> Vec<String> {
        self.state.lock().await.ledger.visited_urls()
    }

    pub async fn visited_count(&self) -> usize {
        self.state.lock().await.ledger.visited_len()
    }

    pub async fn hash_count(&self) -> usize {
        self.state.lock().await.ledger.hash_len()
    }

    async fn visit(&self, url: String, round: usize) -> PageRecord {
        let content = match self.fetcher.try_fetch(&url).await {
            Ok(content) => content,
            Err(err) => {
                err.log(&url);
                let reason = err.to_string();
                let outcome = match err.kind {
                    FailureKind::NotHtml { content_type } => PageOutcome::Skipped { content_type },
                    _ => PageOutcome::Failed { reason },
                };
                return self.finish(PageRecord::new(url, round, outcome));
            }
        };

        let hash = ContentHash::of(&content);
        let archived = if self.archive_duplicates {
            Some(self.store_page(&url, &content, hash).await)
        } else {
            None
        };

        let is_new = self.state.lock().await.ledger.record_hash(hash);
        if !is_new {
            debug!("Skipping duplicate content at {} ({})", url, hash);
            return self.finish(PageRecord::new(url, round, PageOutcome::Duplicate { hash }));
        }

        let outcome = match archived {
            Some(outcome) => outcome,
            None => self.store_page(&url, &content, hash).await,
        };
        let mut record = PageRecord::new(url, round, outcome);
        record.links_discovered = self.discover(&record.url, &content).await;
        self.finish(record)
    }

    /// Offers every link of `content` to the frontier; returns how many
    /// were accepted.
    async fn discover(&self, url: &str, content: &str) -> usize {
        let Ok(base) = Url::parse(url) else {
            return 0;
        };
        let links = extract_links(content, &base);

        let mut state = self.state.lock().await;
        let CrawlState { ledger, frontier } = &mut *state;
        let mut accepted = 0;
        for link in &links {
            if frontier.offer(link, ledger) {
                accepted += 1;
            }
        }
        debug!(
            "{} link(s) on {}, {} new for the frontier",
            links.len(),
            url,
            accepted
        );
        accepted
    }

    async fn store_page(&self, url: &str, content: &str, hash: ContentHash) -> PageOutcome {
        let store = Arc::clone(&self.store);
        let owned_url = url.to_string();
        let owned_content = content.to_string();
        let written = tokio::task::spawn_blocking(move || {
            store
                .store(&owned_url, &owned_content)
                .map_err(|err| err.to_string())
        })
        .await;

        match written {
            Ok(Ok(path)) => {
                debug!("Stored {} at {}", url, path.display());
                PageOutcome::Stored { path, hash }
            }
            Ok(Err(reason)) => {
                error!("Error writing page for {}: {}", url, reason);
                PageOutcome::StoreFailed { hash, reason }
            }
            Err(err) => {
                error!("Store task for {} failed: {}", url, err);
                PageOutcome::StoreFailed {
                    hash,
                    reason: err.to_string(),
                }
            }
        }
    }

    fn finish(&self, record: PageRecord) -> PageRecord {
        self.emit(CrawlEvent::PageFinished {
            round: record.round,
            record: record.clone(),
        });
        record
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }
}

/// Parses and validates a seed URL: absolute, http or https, with a host.
pub fn parse_seed(seed: &str) -> Result<Url> {
    let mut url = Url::parse(seed.trim())
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;
    if Origin::of(&url).is_none() {
        return Err(ScanError::InvalidUrl(format!(
            "{}: expected an http(s) URL with a host",
            seed
        )));
    }
    url.set_fragment(None);
    Ok(url)
}
