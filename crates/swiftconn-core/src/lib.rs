//! Authenticated connections to Swift-compatible object storage.
//!
//! `ConnectionFactory` turns a set of connection parameters into a
//! `Connection`: it authenticates against the Keystone identity service
//! (reusing tokens from a `TokenCache` until they expire), resolves the
//! object-store endpoint from the service catalog, and fetches the
//! configured container, creating it when autocreate is enabled.
//!
//! ```no_run
//! use std::sync::Arc;
//! use swiftconn_core::{ConnectionFactory, ConnectionParams, MemoryCache};
//!
//! # async fn run() -> Result<(), swiftconn_core::ConnectionError> {
//! let factory = ConnectionFactory::with_cache(Arc::new(MemoryCache::new()));
//! let params = ConnectionParams {
//!     url: Some("https://keystone.example.com/v2.0".into()),
//!     username: Some("alice".into()),
//!     password: Some("secret".into()),
//!     tenant: Some("storage".into()),
//!     container: Some("files".into()),
//!     ..Default::default()
//! };
//! let connection = factory.connect(params).await?;
//! println!("{} objects", connection.container().object_count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod observer;

#[cfg(test)]
mod test_helpers;

pub use api::{ApiError, ClientBuilder, HttpClient, HttpClientBuilder, OpenStackApi};
pub use auth::{Credentials, Session, SessionManager};
pub use cache::{FileCache, KeyringCache, MemoryCache, TokenCache};
pub use config::{ConnectionConfig, ConnectionParams};
pub use connection::{Connection, ConnectionFactory, ConnectionState};
pub use error::{AuthError, CatalogError, ConfigError, ConnectionError, ConnectionResult, ErrorCategory};
pub use observer::{ConnectionObserver, TracingObserver};
