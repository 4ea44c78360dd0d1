// Filesystem page store

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tether_scanner::{PageStore, StoreResult};
use thiserror::Error;
use tracing::debug;
use url::Url;

const HTML_SUFFIX: &str = ".html";
/// Leaves room for the suffix and a hash under the common 255-byte limit.
const MAX_STEM_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("cannot derive a filename from {0}")]
    InvalidUrl(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists, creating it if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Filename for a page: `<host[:port]>_<percent-encoded path>.html`.
///
/// Leading and trailing slashes of the path are dropped and everything but
/// ASCII alphanumerics and `-_.~` is percent-encoded, so the name never
/// contains a path separator. A query string is kept (encoded after `%3F`)
/// so `?page=1` and `?page=2` do not overwrite each other. Over-long names
/// are cut and suffixed with a short hash of the full URL.
pub fn page_filename(url: &Url) -> String {
    let netloc = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let mut target = url.path().trim_matches('/').to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut stem = format!("{}_{}", netloc, urlencoding::encode(&target));
    if stem.len() > MAX_STEM_LEN {
        let mut cut = MAX_STEM_LEN;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        stem.truncate(cut);
        stem.push('-');
        stem.push_str(&short_hash(url.as_str()));
    }

    if stem.ends_with(HTML_SUFFIX) {
        stem
    } else {
        format!("{}{}", stem, HTML_SUFFIX)
    }
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(6).map(|b| format!("{:02x}", b)).collect()
}

/// Writes each page to `{dir}/{page_filename(url)}` through a temp file and
/// rename, so readers never observe a half-written page.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Creates the directory and checks that it accepts files.
    pub fn create(dir: PathBuf) -> Result<Self, StoreError> {
        ensure_output_dir(&dir)?;
        NamedTempFile::new_in(&dir).map_err(|e| StoreError::OutputDir(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> Result<PathBuf, StoreError> {
        let parsed = Url::parse(url).map_err(|_| StoreError::InvalidUrl(url.to_string()))?;
        Ok(self.dir.join(page_filename(&parsed)))
    }

    pub fn write_page(&self, url: &str, content: &str) -> Result<PathBuf, StoreError> {
        let target = self.path_for(url)?;
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;

        debug!("Wrote {} bytes to {}", content.len(), target.display());
        Ok(target)
    }
}

impl PageStore for DirectoryStore {
    fn store(&self, url: &str, content: &str) -> StoreResult {
        Ok(self.write_page(url, content)?)
    }
}
