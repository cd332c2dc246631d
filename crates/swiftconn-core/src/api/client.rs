//! HTTP client for the Keystone identity and Swift object-store APIs.
//!
//! `OpenStackApi` is the seam the connection factory talks through;
//! `HttpClient` is the reqwest implementation of it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::{Credentials, Session};
use crate::config::ConnectionConfig;
use crate::models::{Catalog, CatalogItem, Container, Endpoint, ObjectStoreService, Token, UrlType};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const OBJECT_COUNT_HEADER: &str = "X-Container-Object-Count";
const BYTES_USED_HEADER: &str = "X-Container-Bytes-Used";

/// Operations the connection factory needs from the storage provider.
#[async_trait]
pub trait OpenStackApi: Send + Sync {
    /// Exchange credentials for a token and service catalog.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    /// Fetch an existing container.
    async fn get_container(&self, service: &ObjectStoreService, name: &str) -> Result<Container, ApiError>;

    /// Create a container, returning it empty.
    async fn create_container(&self, service: &ObjectStoreService, name: &str) -> Result<Container, ApiError>;
}

/// Constructs an `OpenStackApi` client for a configuration. Must not perform network I/O.
pub trait ClientBuilder: Send + Sync {
    fn build(&self, config: &ConnectionConfig) -> Result<Box<dyn OpenStackApi>, ApiError>;
}

// ============================================================================
// Keystone v2 wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Debug, Serialize)]
struct AuthBody<'a> {
    #[serde(rename = "passwordCredentials")]
    password_credentials: PasswordCredentials<'a>,
    #[serde(rename = "tenantName", skip_serializing_if = "Option::is_none")]
    tenant_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Debug, Deserialize)]
struct Access {
    token: AccessToken,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntryResponse>,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    id: String,
    expires: DateTime<Utc>,
    #[serde(default)]
    tenant: Option<TenantResponse>,
}

#[derive(Debug, Deserialize)]
struct TenantResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEntryResponse {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<EndpointResponse>,
}

#[derive(Debug, Deserialize)]
struct EndpointResponse {
    region: Option<String>,
    #[serde(rename = "publicURL")]
    public_url: Option<String>,
    #[serde(rename = "internalURL")]
    internal_url: Option<String>,
}

impl CatalogEntryResponse {
    /// Flatten v2 endpoints, which carry one url per network, into one
    /// `Endpoint` per url type.
    fn into_item(self) -> Option<CatalogItem> {
        let mut endpoints = Vec::new();
        for e in self.endpoints {
            if let Some(url) = e.public_url {
                endpoints.push(Endpoint::new(UrlType::Public, url, e.region.clone()));
            }
            if let Some(url) = e.internal_url {
                endpoints.push(Endpoint::new(UrlType::Internal, url, e.region));
            }
        }

        match CatalogItem::new(self.name, self.service_type, endpoints, None) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping malformed catalog entry");
                None
            }
        }
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        let access = response.access;
        let mut token = Token::new(access.token.id, access.token.expires);
        if let Some(tenant) = access.token.tenant {
            token = token.with_tenant(tenant.id);
        }
        let catalog: Catalog = access
            .service_catalog
            .into_iter()
            .filter_map(CatalogEntryResponse::into_item)
            .collect::<Vec<_>>()
            .into();
        Session::new(token, catalog)
    }
}

// ============================================================================
// Client
// ============================================================================

/// reqwest-backed client bound to one identity endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    auth_url: String,
}

impl HttpClient {
    pub fn new(auth_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(auth_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(auth_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            auth_url: auth_url.into(),
        })
    }

    fn tokens_url(&self) -> String {
        format!("{}/tokens", self.auth_url.trim_end_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn header_u64(response: &Response, name: &str) -> u64 {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl OpenStackApi for HttpClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = self.tokens_url();
        let body = AuthRequest {
            auth: AuthBody {
                password_credentials: PasswordCredentials {
                    username: &credentials.username,
                    password: &credentials.password,
                },
                tenant_name: credentials.tenant.as_deref(),
            },
        };

        debug!(url = %url, username = %credentials.username, "Authenticating");
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, &url))?;

        let response = Self::check_response(response).await?;
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse auth response: {}", e)))?;

        Ok(auth.into())
    }

    async fn get_container(&self, service: &ObjectStoreService, name: &str) -> Result<Container, ApiError> {
        let url = service.container_url(name)?;
        debug!(url = %url, "Fetching container");

        let response = self
            .client
            .head(url.clone())
            .header(AUTH_TOKEN_HEADER, &service.token)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, url.as_str()))?;

        let response = Self::check_response(response).await?;
        Ok(Container {
            name: name.to_string(),
            object_count: Self::header_u64(&response, OBJECT_COUNT_HEADER),
            bytes_used: Self::header_u64(&response, BYTES_USED_HEADER),
        })
    }

    async fn create_container(&self, service: &ObjectStoreService, name: &str) -> Result<Container, ApiError> {
        let url = service.container_url(name)?;
        debug!(url = %url, "Creating container");

        let response = self
            .client
            .put(url.clone())
            .header(AUTH_TOKEN_HEADER, &service.token)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, url.as_str()))?;

        Self::check_response(response).await?;
        Ok(Container::empty(name))
    }
}

/// Builds an `HttpClient` for the configured identity endpoint.
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientBuilder for HttpClientBuilder {
    fn build(&self, config: &ConnectionConfig) -> Result<Box<dyn OpenStackApi>, ApiError> {
        Ok(Box::new(HttpClient::with_timeout(&config.url, self.timeout)?))
    }
}

// ============================================================================
// Tests
// ============================================================================
