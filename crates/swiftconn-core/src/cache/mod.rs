//! Token caching.
//!
//! A `TokenCache` is a plain byte-blob store keyed by string. It knows
//! nothing about expiry; the session manager decides whether a cached token
//! is still usable. Implementations must tolerate concurrent `get`/`set`
//! from several connection attempts; last write wins.
//!
//! - `MemoryCache`: process-local map
//! - `FileCache`: one JSON file per key on disk
//! - `KeyringCache`: OS keychain entry per key

pub mod file;
pub mod keychain;
pub mod memory;

use anyhow::Result;

pub use file::FileCache;
pub use keychain::KeyringCache;
pub use memory::MemoryCache;

pub trait TokenCache: Send + Sync {
    /// Fetch the blob stored under `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}
