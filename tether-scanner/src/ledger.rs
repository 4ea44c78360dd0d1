use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// SHA-256 digest of a page's UTF-8 text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({self})")
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// URL-level and content-level membership for one crawl.
///
/// Both sets only ever grow. A URL is reserved before its fetch is
/// dispatched, so it is never scheduled twice even while in flight.
#[derive(Debug, Default)]
pub struct DedupLedger {
    visited: HashSet<String>,
    hashes: HashSet<ContentHash>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Marks every URL of `batch` visited and returns the ones that were not
    /// visited before, in batch order.
    pub fn reserve_batch(&mut self, batch: Vec<String>) -> Vec<String> {
        batch
            .into_iter()
            .filter(|url| self.visited.insert(url.clone()))
            .collect()
    }

    /// Records `hash`, returning `false` if it was already known.
    pub fn record_hash(&mut self, hash: ContentHash) -> bool {
        self.hashes.insert(hash)
    }

    pub fn has_hash(&self, hash: &ContentHash) -> bool {
        self.hashes.contains(hash)
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn hash_len(&self) -> usize {
        self.hashes.len()
    }

    pub fn visited_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.visited.iter().cloned().collect();
        urls.sort();
        urls
    }
}
