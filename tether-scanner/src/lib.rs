pub mod crawler;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod ledger;
pub mod links;
pub mod result;
pub mod store;

pub use crawler::{Crawler, DEFAULT_CONCURRENCY, EventCallback, parse_seed};
pub use error::ScanError;
pub use fetch::{FailureKind, FetchError, FetchSettings, PageFetcher};
pub use frontier::{Frontier, Origin};
pub use ledger::{ContentHash, DedupLedger};
pub use links::extract_links;
pub use result::{CrawlEvent, CrawlSummary, PageOutcome, PageRecord};
pub use store::{PageStore, StoreResult};
