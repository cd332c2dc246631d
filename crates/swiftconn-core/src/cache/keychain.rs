use anyhow::{Context, Result};
use keyring::Entry;

use super::TokenCache;

const DEFAULT_SERVICE_NAME: &str = "swiftconn";

/// Token cache backed by the OS keychain, for hosts that must not keep
/// tokens on disk in the clear.
#[derive(Debug, Clone)]
pub struct KeyringCache {
    service: String,
}

impl KeyringCache {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCache {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl TokenCache for KeyringCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.entry(key)?.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entry(key)?
            .set_secret(value)
            .context("Failed to store token in keychain")
    }
}
