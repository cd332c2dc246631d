//! Data models for identity and storage entities.
//!
//! - `Catalog`, `CatalogItem`, `Endpoint`, `UrlType`: the service catalog
//! - `Token`, `CachedToken`: identity tokens and their cached form
//! - `ObjectStoreService`, `Container`: resolved storage handles

pub mod catalog;
pub mod storage;
pub mod token;

pub use catalog::{Catalog, CatalogItem, Endpoint, InvalidEntry, UrlType};
pub use storage::{Container, ObjectStoreService};
pub use token::{CachedToken, Token};
