//! Service catalog resolution.
//!
//! Picks the catalog entry for the configured object-store service and
//! narrows it down to a single endpoint for the requested url type and
//! region.

use tracing::debug;

use crate::error::{CatalogError, ConfigError, ConnectionResult};
use crate::models::{Catalog, CatalogItem, Endpoint, ObjectStoreService, Token, UrlType};

/// Service name used when the configuration does not override it.
pub const DEFAULT_SERVICE_NAME: &str = "swift";

/// Names of every service in the catalog, comma-joined for diagnostics.
pub fn available_service_names(catalog: &Catalog) -> String {
    catalog.service_names().join(", ")
}

/// Find the catalog item for `service_name`, checking that it is offered in
/// `region` when one is configured.
pub fn resolve<'a>(
    catalog: &'a Catalog,
    service_name: &str,
    region: Option<&str>,
) -> ConnectionResult<&'a CatalogItem> {
    if catalog.is_empty() {
        return Err(CatalogError::Empty.into());
    }

    let item = catalog.find(service_name).ok_or_else(|| CatalogError::ServiceNotFound {
        service: service_name.to_string(),
        available: available_service_names(catalog),
    })?;

    if let Some(region) = region {
        validate_region(item, region)?;
    }

    debug!(service = service_name, endpoints = item.endpoints().len(), "Resolved catalog item");
    Ok(item)
}

fn validate_region(item: &CatalogItem, region: &str) -> Result<(), ConfigError> {
    if item.offers_region(region) {
        return Ok(());
    }
    Err(ConfigError::RegionNotOffered {
        service: item.name().to_string(),
        region: region.to_string(),
        available: item.regions().join(", "),
    })
}

/// Pick the endpoint of `item` matching `url_type`, restricted to `region` when set.
pub fn select_endpoint<'a>(
    item: &'a CatalogItem,
    region: Option<&str>,
    url_type: UrlType,
) -> Result<&'a Endpoint, CatalogError> {
    item.endpoints()
        .iter()
        .filter(|e| e.url_type == url_type)
        .find(|e| match region {
            // Endpoints without their own region inherit the item's.
            Some(r) => e.in_region(r) || (e.region.is_none() && item.region() == Some(r)),
            None => true,
        })
        .ok_or_else(|| CatalogError::EndpointNotFound {
            service: item.name().to_string(),
            url_type,
            region: region.map(str::to_string),
        })
}

/// Scope the object-store service to one endpoint, ready for container requests.
pub fn object_store_service(
    item: &CatalogItem,
    region: Option<&str>,
    url_type: UrlType,
    token: &Token,
) -> Result<ObjectStoreService, CatalogError> {
    let endpoint = select_endpoint(item, region, url_type)?;
    Ok(ObjectStoreService {
        name: item.name().to_string(),
        region: endpoint
            .region
            .clone()
            .or_else(|| item.region().map(str::to_string)),
        url_type,
        url: endpoint.url.clone(),
        token: token.id.clone(),
    })
}
