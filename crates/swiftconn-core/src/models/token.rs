//! Identity tokens and their cached form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Catalog;

/// Treat a token as expired this long before the identity service would.
/// Keeps a token from lapsing between the expiry check and the container request.
const TOKEN_EXPIRY_SKEW_SECS: i64 = 30;

/// Opaque credential issued by the identity service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Token {
    pub fn new(id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            expires_at,
            tenant_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS) >= self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("id", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Serialized form of a token and its catalog, as stored in a `TokenCache`.
///
/// The token fields sit at the top level next to `catalog`:
///
/// ```json
/// { "id": "...", "expires_at": "...", "catalog": [ { "name": "swift", "type": "object-store",
///   "endpoints": [ { "urlType": "publicURL", "url": "...", "region": "us" } ] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    #[serde(flatten)]
    pub token: Token,
    pub catalog: Catalog,
}

impl CachedToken {
    pub fn new(token: Token, catalog: Catalog) -> Self {
        Self { token, catalog }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
