use crate::ledger::ContentHash;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// What happened to a single dispatched URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// New content, written to the page store.
    Stored { path: PathBuf, hash: ContentHash },
    /// New content whose write failed. Links were still processed.
    StoreFailed { hash: ContentHash, reason: String },
    /// Content already seen under another URL.
    Duplicate { hash: ContentHash },
    /// Response was not HTML.
    Skipped { content_type: Option<String> },
    /// Transport error, timeout or non-2xx status.
    Failed { reason: String },
}

impl PageOutcome {
    /// Content hash for every outcome that produced HTML.
    pub fn hash(&self) -> Option<&ContentHash> {
        match self {
            PageOutcome::Stored { hash, .. }
            | PageOutcome::StoreFailed { hash, .. }
            | PageOutcome::Duplicate { hash } => Some(hash),
            PageOutcome::Skipped { .. } | PageOutcome::Failed { .. } => None,
        }
    }

    pub fn is_new_content(&self) -> bool {
        matches!(
            self,
            PageOutcome::Stored { .. } | PageOutcome::StoreFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub round: usize,
    pub outcome: PageOutcome,
    /// New frontier entries this page contributed.
    pub links_discovered: usize,
}

impl PageRecord {
    pub fn new(url: String, round: usize, outcome: PageOutcome) -> Self {
        Self {
            url,
            round,
            outcome,
            links_discovered: 0,
        }
    }

    pub fn with_error(url: String, round: usize, reason: String) -> Self {
        Self::new(url, round, PageOutcome::Failed { reason })
    }
}

/// Progress notifications emitted by the crawler.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    RoundStarted { round: usize, batch_size: usize },
    PageFinished { round: usize, record: PageRecord },
    RoundFinished { round: usize, frontier_size: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub origin: String,
    pub rounds: usize,
    pub pages: Vec<PageRecord>,
    /// Every URL reserved during the run, sorted.
    pub visited: Vec<String>,
    pub distinct_hashes: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn stored_count(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Stored { .. }))
    }

    pub fn store_failed_count(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::StoreFailed { .. }))
    }

    pub fn duplicate_count(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Duplicate { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Skipped { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, PageOutcome::Failed { .. }))
    }

    /// URLs dispatched in `round`, sorted.
    pub fn urls_in_round(&self, round: usize) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .pages
            .iter()
            .filter(|p| p.round == round)
            .map(|p| p.url.as_str())
            .collect();
        urls.sort_unstable();
        urls
    }

    pub fn record_for(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|p| p.url == url)
    }

    fn count(&self, pred: impl Fn(&PageOutcome) -> bool) -> usize {
        self.pages.iter().filter(|p| pred(&p.outcome)).count()
    }
}
