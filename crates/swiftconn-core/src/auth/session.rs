use tracing::{debug, info, warn};

use crate::api::OpenStackApi;
use crate::cache::TokenCache;
use crate::config::ConnectionConfig;
use crate::error::AuthError;
use crate::models::{CachedToken, Catalog, Token};
use crate::observer::ConnectionObserver;

/// A token together with the catalog it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Token,
    pub catalog: Catalog,
}

impl Session {
    pub fn new(token: Token, catalog: Catalog) -> Self {
        Self { token, catalog }
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_expired()
    }
}

impl From<CachedToken> for Session {
    fn from(cached: CachedToken) -> Self {
        Self::new(cached.token, cached.catalog)
    }
}

impl From<&Session> for CachedToken {
    fn from(session: &Session) -> Self {
        CachedToken::new(session.token.clone(), session.catalog.clone())
    }
}

/// Produces a valid session for a configuration, reusing cached tokens
/// until they expire.
pub struct SessionManager<'a> {
    cache: &'a dyn TokenCache,
    observer: &'a dyn ConnectionObserver,
}

impl<'a> SessionManager<'a> {
    pub fn new(cache: &'a dyn TokenCache, observer: &'a dyn ConnectionObserver) -> Self {
        Self { cache, observer }
    }

    /// Read a cached token. Any failure to read or rebuild it counts as a miss.
    pub fn import_token(&self, cache_key: &str) -> Option<Session> {
        let blob = match self.cache.get(cache_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!(key = cache_key, "No cached token");
                return None;
            }
            Err(e) => {
                warn!(key = cache_key, error = %e, "Failed to read token cache");
                return None;
            }
        };

        match CachedToken::from_bytes(&blob) {
            Ok(cached) => Some(cached.into()),
            Err(e) => {
                warn!(key = cache_key, error = %e, "Discarding malformed cached token");
                None
            }
        }
    }

    /// Write a session back to the cache. Failures are reported, never raised.
    pub fn export_token(&self, cache_key: &str, session: &Session) {
        let result = CachedToken::from(session)
            .to_bytes()
            .map_err(anyhow::Error::from)
            .and_then(|bytes| self.cache.set(cache_key, &bytes));

        if let Err(e) = result {
            self.observer.cache_write_failed(cache_key, &e);
        }
    }

    /// Return the cached session if still valid, otherwise authenticate and cache the result.
    pub async fn obtain(
        &self,
        client: &dyn OpenStackApi,
        config: &ConnectionConfig,
    ) -> Result<Session, AuthError> {
        let cache_key = config.cache_key();

        if let Some(session) = self.import_token(&cache_key) {
            if !session.is_expired() {
                debug!(
                    key = %cache_key,
                    expires_in_secs = session.token.time_until_expiry().num_seconds(),
                    "Reusing cached token"
                );
                return Ok(session);
            }
            info!(key = %cache_key, "Cached token expired, re-authenticating");
        }

        let session = client
            .authenticate(&config.credentials)
            .await
            .map_err(AuthError::from_api)?;

        self.observer.authenticated(&cache_key, &session.token);
        self.export_token(&cache_key, &session);
        Ok(session)
    }
}
