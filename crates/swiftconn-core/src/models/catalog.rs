//! Service catalog types as reported by the identity service.
//!
//! Catalog entries are validated on construction and on deserialization,
//! so a `CatalogItem` in hand always has a name, a type and well-formed
//! endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a catalog entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEntry {
    #[error("catalog item is missing a {0}")]
    MissingField(&'static str),

    #[error("endpoint for {service} has an empty url")]
    EmptyUrl { service: String },
}

/// Which network a resolved endpoint is reachable from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UrlType {
    #[serde(rename = "internalURL", alias = "internal")]
    Internal,
    #[default]
    #[serde(rename = "publicURL", alias = "public")]
    Public,
}

impl UrlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlType::Internal => "internalURL",
            UrlType::Public => "publicURL",
        }
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internalURL" | "internal" => Ok(UrlType::Internal),
            "publicURL" | "public" => Ok(UrlType::Public),
            other => Err(other.to_string()),
        }
    }
}

/// A single reachable address for a catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "urlType")]
    pub url_type: UrlType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Endpoint {
    pub fn new(url_type: UrlType, url: impl Into<String>, region: Option<String>) -> Self {
        Self {
            url_type,
            url: url.into(),
            region,
        }
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }
}

/// Wire shape of a catalog item before validation.
#[derive(Debug, Deserialize)]
struct RawCatalogItem {
    name: String,
    #[serde(rename = "type")]
    service_type: String,
    endpoints: Vec<Endpoint>,
    #[serde(default)]
    region: Option<String>,
}

/// One service offered by the storage provider.
///
/// Identified by `(name, service_type)` within a single catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogItem")]
pub struct CatalogItem {
    name: String,
    #[serde(rename = "type")]
    service_type: String,
    endpoints: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
}

impl CatalogItem {
    pub fn new(
        name: impl Into<String>,
        service_type: impl Into<String>,
        endpoints: Vec<Endpoint>,
        region: Option<String>,
    ) -> Result<Self, InvalidEntry> {
        let name = name.into();
        let service_type = service_type.into();

        if name.trim().is_empty() {
            return Err(InvalidEntry::MissingField("name"));
        }
        if service_type.trim().is_empty() {
            return Err(InvalidEntry::MissingField("type"));
        }
        if endpoints.iter().any(|e| e.url.trim().is_empty()) {
            return Err(InvalidEntry::EmptyUrl { service: name });
        }

        Ok(Self {
            name,
            service_type,
            endpoints,
            region,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Whether this service can be reached in `region`, either through the
    /// item-level region or any of its endpoints.
    pub fn offers_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.endpoints.iter().any(|e| e.in_region(region))
    }

    /// All distinct regions this service advertises, in catalog order.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::new();
        let candidates = self
            .region
            .as_deref()
            .into_iter()
            .chain(self.endpoints.iter().filter_map(|e| e.region.as_deref()));
        for region in candidates {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        regions
    }
}

impl TryFrom<RawCatalogItem> for CatalogItem {
    type Error = InvalidEntry;

    fn try_from(raw: RawCatalogItem) -> Result<Self, Self::Error> {
        CatalogItem::new(raw.name, raw.service_type, raw.endpoints, raw.region)
    }
}

/// Ordered list of services reported by the identity service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn find(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }
}

impl From<Vec<CatalogItem>> for Catalog {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}
