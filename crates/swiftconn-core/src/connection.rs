//! Connection factory: configuration to a ready-to-use container handle.
//!
//! A connection attempt walks
//! `Unconfigured -> Authenticating -> CatalogResolved -> ContainerAcquired`
//! and may fail out of any state after the first. The only side effect left
//! behind by a failed attempt is a token written to the cache during
//! authentication.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::{ApiError, ClientBuilder, HttpClientBuilder, OpenStackApi};
use crate::auth::SessionManager;
use crate::cache::TokenCache;
use crate::catalog;
use crate::config::{ConnectionConfig, ConnectionParams};
use crate::error::{ConnectionError, ConnectionResult};
use crate::models::{Container, ObjectStoreService};
use crate::observer::{ConnectionObserver, TracingObserver};

/// Progress of a single connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconfigured,
    Authenticating,
    CatalogResolved,
    ContainerAcquired,
}

/// An object-store service and the container acquired through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    service: ObjectStoreService,
    container: Container,
}

impl Connection {
    pub fn service(&self) -> &ObjectStoreService {
        &self.service
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn into_parts(self) -> (ObjectStoreService, Container) {
        (self.service, self.container)
    }
}

/// Opens authenticated connections to Swift object storage.
///
/// Holds no per-connection state: every `connect` call is independent apart
/// from the shared token cache.
#[derive(Clone)]
pub struct ConnectionFactory {
    cache: Arc<dyn TokenCache>,
    builder: Arc<dyn ClientBuilder>,
    observer: Arc<dyn ConnectionObserver>,
}

impl ConnectionFactory {
    pub fn new(
        cache: Arc<dyn TokenCache>,
        builder: Arc<dyn ClientBuilder>,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Self {
        Self {
            cache,
            builder,
            observer,
        }
    }

    /// Factory talking HTTP to the real services and logging through `tracing`.
    pub fn with_cache(cache: Arc<dyn TokenCache>) -> Self {
        Self::new(cache, Arc::new(HttpClientBuilder::default()), Arc::new(TracingObserver))
    }

    /// Normalize `params` and connect.
    pub async fn connect(&self, params: ConnectionParams) -> ConnectionResult<Connection> {
        let config = ConnectionConfig::resolve(params)?;
        self.connect_with(&config).await
    }

    #[instrument(skip_all, fields(url = %config.url, container = %config.container))]
    pub async fn connect_with(&self, config: &ConnectionConfig) -> ConnectionResult<Connection> {
        let mut state = ConnectionState::Unconfigured;
        let client = self.builder.build(config).map_err(ConnectionError::Client)?;

        advance(&mut state, ConnectionState::Authenticating);
        let session = SessionManager::new(self.cache.as_ref(), self.observer.as_ref())
            .obtain(client.as_ref(), config)
            .await?;

        let item = catalog::resolve(&session.catalog, &config.service_name, config.region.as_deref())?;
        let service = catalog::object_store_service(
            item,
            config.region.as_deref(),
            config.url_type,
            &session.token,
        )?;
        advance(&mut state, ConnectionState::CatalogResolved);

        let container = self.acquire_container(client.as_ref(), &service, config).await?;
        advance(&mut state, ConnectionState::ContainerAcquired);

        Ok(Connection { service, container })
    }

    async fn acquire_container(
        &self,
        client: &dyn OpenStackApi,
        service: &ObjectStoreService,
        config: &ConnectionConfig,
    ) -> ConnectionResult<Container> {
        match client.get_container(service, &config.container).await {
            Ok(container) => Ok(container),
            Err(e) if e.is_not_found() && config.autocreate => {
                let container = client
                    .create_container(service, &config.container)
                    .await
                    .map_err(|e| self.storage_error(e))?;
                self.observer.container_created(&config.container);
                Ok(container)
            }
            Err(e) => Err(self.storage_error(e)),
        }
    }

    /// Separate unreachable storage from errors the server actually returned.
    fn storage_error(&self, err: ApiError) -> ConnectionError {
        match err.unreachable_host() {
            Some(host) => {
                let host = host.to_string();
                self.observer.storage_unreachable(&host, &err);
                ConnectionError::Unavailable { host, source: err }
            }
            None => ConnectionError::Storage(err),
        }
    }
}

fn advance(state: &mut ConnectionState, next: ConnectionState) {
    debug!(from = ?state, to = ?next, "Connection state");
    *state = next;
}
