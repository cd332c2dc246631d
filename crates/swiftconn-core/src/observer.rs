//! Hooks for noteworthy events during a connection attempt.
//!
//! The factory reports through the observer it was constructed with rather
//! than a process-wide logger, so hosts can route these events into their
//! own logging or metrics.

use tracing::{error, info, warn};

use crate::api::ApiError;
use crate::models::Token;

pub trait ConnectionObserver: Send + Sync {
    /// A fresh token was issued for `cache_key`.
    fn authenticated(&self, cache_key: &str, token: &Token);

    /// The token could not be written back to the cache. The connection continues.
    fn cache_write_failed(&self, cache_key: &str, error: &anyhow::Error);

    /// `container` did not exist and was created.
    fn container_created(&self, container: &str);

    /// The object-store endpoint at `host` could not be reached.
    fn storage_unreachable(&self, host: &str, error: &ApiError);
}

/// Reports events as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConnectionObserver for TracingObserver {
    fn authenticated(&self, cache_key: &str, token: &Token) {
        info!(key = cache_key, expires_at = %token.expires_at, "Authenticated with identity service");
    }

    fn cache_write_failed(&self, cache_key: &str, error: &anyhow::Error) {
        warn!(key = cache_key, error = %error, "Failed to cache token");
    }

    fn container_created(&self, container: &str) {
        info!(container, "Created missing container");
    }

    fn storage_unreachable(&self, host: &str, error: &ApiError) {
        error!(host, error = %error, "Can't connect to object storage server at {}", host);
    }
}
