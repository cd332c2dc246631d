//! Shared fixtures and mocks for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;

use crate::api::{ApiError, ClientBuilder, OpenStackApi};
use crate::auth::{Credentials, Session};
use crate::cache::TokenCache;
use crate::config::ConnectionConfig;
use crate::models::{Catalog, CatalogItem, Container, Endpoint, ObjectStoreService, Token, UrlType};
use crate::observer::ConnectionObserver;

pub fn fresh_token(id: &str) -> Token {
    Token::new(id, Utc::now() + Duration::hours(1))
}

pub fn expired_token(id: &str) -> Token {
    Token::new(id, Utc::now() - Duration::minutes(5))
}

/// Catalog with a `swift` service in region `us` followed by an `other` service.
pub fn swift_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogItem::new(
            "swift",
            "object-store",
            vec![
                Endpoint::new(UrlType::Public, "https://swift.example.com:8443/v1/AUTH_t", Some("us".into())),
                Endpoint::new(UrlType::Internal, "http://10.0.0.1:8080/v1/AUTH_t", Some("us".into())),
            ],
            None,
        )
        .expect("valid item"),
        CatalogItem::new(
            "other",
            "compute",
            vec![Endpoint::new(UrlType::Public, "https://compute.example.com", Some("us".into()))],
            None,
        )
        .expect("valid item"),
    ])
}

/// How the mock answers container requests.
#[derive(Debug, Clone)]
pub enum ContainerBehavior {
    Exists,
    Missing,
    Unreachable(String),
    Fails(StatusCode),
    /// Missing, and creating it answers with this status.
    CreateFails(StatusCode),
    /// Missing, and the host goes away before it can be created.
    CreateUnreachable(String),
}

#[derive(Debug)]
struct MockState {
    auth_calls: AtomicU32,
    get_calls: AtomicU32,
    create_calls: AtomicU32,
    auth_failure: Option<StatusCode>,
    catalog: Catalog,
    container: ContainerBehavior,
    last_service: Mutex<Option<ObjectStoreService>>,
}

/// Scriptable `OpenStackApi`. Clones share call counters.
#[derive(Debug, Clone)]
pub struct MockApi {
    state: Arc<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::build(None, swift_catalog(), ContainerBehavior::Exists)
    }

    fn build(auth_failure: Option<StatusCode>, catalog: Catalog, container: ContainerBehavior) -> Self {
        Self {
            state: Arc::new(MockState {
                auth_calls: AtomicU32::new(0),
                get_calls: AtomicU32::new(0),
                create_calls: AtomicU32::new(0),
                auth_failure,
                catalog,
                container,
                last_service: Mutex::new(None),
            }),
        }
    }

    pub fn failing_auth(self, status: StatusCode) -> Self {
        Self::build(Some(status), self.state.catalog.clone(), self.state.container.clone())
    }

    pub fn with_catalog(self, catalog: Catalog) -> Self {
        Self::build(self.state.auth_failure, catalog, self.state.container.clone())
    }

    pub fn with_container(self, container: ContainerBehavior) -> Self {
        Self::build(self.state.auth_failure, self.state.catalog.clone(), container)
    }

    pub fn auth_calls(&self) -> u32 {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> u32 {
        self.state.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_service(&self) -> Option<ObjectStoreService> {
        self.state.last_service.lock().ok().and_then(|s| s.clone())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenStackApi for MockApi {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Session, ApiError> {
        let n = self.state.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(status) = self.state.auth_failure {
            return Err(ApiError::from_status(status, "mock failure"));
        }
        Ok(Session::new(fresh_token(&format!("issued-{}", n)), self.state.catalog.clone()))
    }

    async fn get_container(&self, service: &ObjectStoreService, name: &str) -> Result<Container, ApiError> {
        self.state.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.state.last_service.lock() {
            *last = Some(service.clone());
        }
        match &self.state.container {
            ContainerBehavior::Exists => Ok(Container {
                name: name.to_string(),
                object_count: 7,
                bytes_used: 1024,
            }),
            ContainerBehavior::Missing
            | ContainerBehavior::CreateFails(_)
            | ContainerBehavior::CreateUnreachable(_) => Err(ApiError::from_status(StatusCode::NOT_FOUND, name)),
            ContainerBehavior::Unreachable(host) => Err(ApiError::Connect {
                host: host.clone(),
                message: "connection refused".to_string(),
            }),
            ContainerBehavior::Fails(status) => Err(ApiError::from_status(*status, "mock failure")),
        }
    }

    async fn create_container(&self, _service: &ObjectStoreService, name: &str) -> Result<Container, ApiError> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        match &self.state.container {
            ContainerBehavior::CreateFails(status) => Err(ApiError::from_status(*status, "mock failure")),
            ContainerBehavior::CreateUnreachable(host) => Err(ApiError::Connect {
                host: host.clone(),
                message: "connection refused".to_string(),
            }),
            _ => Ok(Container::empty(name)),
        }
    }
}

/// Hands out clones of one `MockApi` and counts how often it was asked.
#[derive(Debug, Default)]
pub struct MockBuilder {
    pub api: MockApi,
    pub builds: AtomicU32,
}

impl MockBuilder {
    pub fn new(api: MockApi) -> Self {
        Self {
            api,
            builds: AtomicU32::new(0),
        }
    }
}

impl ClientBuilder for MockBuilder {
    fn build(&self, _config: &ConnectionConfig) -> Result<Box<dyn OpenStackApi>, ApiError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.api.clone()))
    }
}

/// Cache whose every operation fails.
pub struct FailingCache;

impl TokenCache for FailingCache {
    fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Err(anyhow::anyhow!("cache offline"))
    }

    fn set(&self, _key: &str, _value: &[u8]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("cache offline"))
    }
}

/// Observer that records event names for assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ConnectionObserver for RecordingObserver {
    fn authenticated(&self, cache_key: &str, _token: &Token) {
        self.record(format!("authenticated:{}", cache_key));
    }

    fn cache_write_failed(&self, cache_key: &str, _error: &anyhow::Error) {
        self.record(format!("cache_write_failed:{}", cache_key));
    }

    fn container_created(&self, container: &str) {
        self.record(format!("container_created:{}", container));
    }

    fn storage_unreachable(&self, host: &str, _error: &ApiError) {
        self.record(format!("storage_unreachable:{}", host));
    }
}

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("swiftconn_core=debug"))
        .with_test_writer()
        .try_init();
}
