use crate::ledger::DedupLedger;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;
use url::Url;

/// Network location of the seed: host plus any explicit, non-default port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Returns `None` for URLs that cannot anchor a crawl (no host, or a
    /// scheme other than http/https).
    pub fn of(url: &Url) -> Option<Self> {
        if !is_web_scheme(url) {
            return None;
        }
        let host = url.host_str()?;
        Some(Self {
            host: host.to_string(),
            port: url.port(),
        })
    }

    pub fn contains(&self, url: &Url) -> bool {
        is_web_scheme(url) && url.host_str() == Some(self.host.as_str()) && url.port() == self.port
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// URLs discovered but not yet dispatched, confined to one origin.
#[derive(Debug)]
pub struct Frontier {
    origin: Origin,
    pending: HashSet<String>,
    max_pages: Option<usize>,
}

impl Frontier {
    pub fn new(origin: Origin, seed: &Url) -> Self {
        let mut pending = HashSet::new();
        pending.insert(seed.to_string());
        Self {
            origin,
            pending,
            max_pages: None,
        }
    }

    /// Stops admitting URLs once `limit` URLs are visited or pending.
    pub fn with_max_pages(mut self, limit: Option<usize>) -> Self {
        self.max_pages = limit;
        self
    }

    pub fn set_max_pages(&mut self, limit: Option<usize>) {
        self.max_pages = limit;
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Accepts `url` for the next round if it shares the origin and is
    /// neither visited nor already pending.
    pub fn offer(&mut self, url: &Url, ledger: &DedupLedger) -> bool {
        if !self.origin.contains(url) {
            return false;
        }
        let key = url.as_str();
        if ledger.is_visited(key) || self.pending.contains(key) {
            return false;
        }
        if let Some(limit) = self.max_pages
            && ledger.visited_len() + self.pending.len() >= limit
        {
            debug!(url = %url, limit, "Page limit reached, not queueing");
            return false;
        }
        self.pending.insert(key.to_string());
        true
    }

    /// Drains the pending set. Sorted so that dispatch order is stable.
    pub fn take_batch(&mut self) -> Vec<String> {
        let mut batch: Vec<String> = self.pending.drain().collect();
        batch.sort();
        batch
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
