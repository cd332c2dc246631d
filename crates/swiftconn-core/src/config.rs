//! Connection configuration.
//!
//! Raw `ConnectionParams` arrive from whatever loads the host application's
//! settings. `ConnectionConfig::resolve` normalizes them once (legacy key
//! aliases, defaults, url type validation) into an immutable value that the
//! rest of the connection flow reads from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::catalog::DEFAULT_SERVICE_NAME;
use crate::error::ConfigError;
use crate::models::UrlType;

/// Application name used for cache directory paths
const APP_NAME: &str = "swiftconn";

/// Container used when neither `container` nor `bucket` is configured
pub const DEFAULT_CONTAINER: &str = "owncloud";

/// Connection parameters as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParams {
    pub url: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "credential")]
    pub password: Option<String>,
    #[serde(alias = "tenantName")]
    pub tenant: Option<String>,
    /// Legacy name for `container`.
    pub bucket: Option<String>,
    pub container: Option<String>,
    pub autocreate: Option<bool>,
    pub service_name: Option<String>,
    pub region: Option<String>,
    pub url_type: Option<String>,
}

impl ConnectionParams {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse connection parameters")
    }

    /// Load parameters from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read connection config: {}", path.display()))?;
        Self::from_json(&contents)
    }
}

/// Normalized, validated connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub credentials: Credentials,
    pub container: String,
    pub autocreate: bool,
    pub service_name: String,
    pub region: Option<String>,
    pub url_type: UrlType,
}

impl ConnectionConfig {
    pub fn resolve(params: ConnectionParams) -> Result<Self, ConfigError> {
        let url = required(params.url, "url")?;
        let username = required(params.username, "username")?;
        let password = required(params.password, "password")?;

        let url_type = match params.url_type {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidUrlType)?,
            None => UrlType::default(),
        };

        let container = params
            .container
            .or(params.bucket)
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_string());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            credentials: Credentials::new(username, password, params.tenant),
            container,
            autocreate: params.autocreate.unwrap_or(false),
            service_name: params
                .service_name
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            region: params.region,
            url_type,
        })
    }

    /// Key under which this connection's token is cached.
    pub fn cache_key(&self) -> String {
        format!("{}@{}/{}", self.credentials.username, self.url, self.container)
    }
}

impl TryFrom<ConnectionParams> for ConnectionConfig {
    type Error = ConfigError;

    fn try_from(params: ConnectionParams) -> Result<Self, Self::Error> {
        Self::resolve(params)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingField(field))
}

/// Default directory for on-disk token caches.
pub fn default_cache_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME).join("tokens"))
}
