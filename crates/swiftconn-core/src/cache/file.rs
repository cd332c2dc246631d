use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::TokenCache;
use crate::config::default_cache_dir;

/// Longest encoded key used verbatim as a file stem. Leaves room under the
/// usual 255-byte name limit for `.json` and the temp-file suffix.
const MAX_STEM_LEN: usize = 180;

/// Distinguishes temp files written by concurrent `set` calls in one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Token cache persisted as one file per key.
///
/// Writes land in a temp file that is renamed over the target, so a reader
/// sees either the previous blob or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    /// Cache under the platform cache directory.
    pub fn in_default_location() -> Result<Self> {
        Self::new(default_cache_dir()?)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", encode_key(key)))
    }
}

impl TokenCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.cache_path(key);
        let tmp = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write cache file: {}", tmp.display()))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to replace cache file: {}", path.display()));
        }

        debug!(path = %path.display(), bytes = value.len(), "Wrote token cache file");
        Ok(())
    }
}

/// Map a cache key onto a file name, escaping anything outside `[A-Za-z0-9._-]`.
///
/// Keys whose escaped form exceeds `MAX_STEM_LEN` keep a readable prefix
/// followed by the SHA-256 of the full key.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    if encoded.len() <= MAX_STEM_LEN {
        return encoded;
    }

    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    // The escaped form is ASCII, so any byte offset is a char boundary.
    encoded.truncate(MAX_STEM_LEN - digest.len() - 1);
    encoded.push('~');
    encoded.push_str(&digest);
    encoded
}
