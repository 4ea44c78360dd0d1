use std::path::PathBuf;

pub type StoreResult = std::result::Result<PathBuf, Box<dyn std::error::Error + Send + Sync>>;

/// Sink for fetched page content.
///
/// Implementations derive the storage location from the URL alone, so the
/// same URL always lands in the same place. Writes run on tokio's blocking
/// pool and may happen concurrently for distinct URLs.
pub trait PageStore: Send + Sync {
    fn store(&self, url: &str, content: &str) -> StoreResult;
}
