//! Resolved object-store handles.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::UrlType;
use crate::api::ApiError;

/// An object-store service scoped to one endpoint and token.
#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStoreService {
    pub name: String,
    pub region: Option<String>,
    pub url_type: UrlType,
    /// Storage account url, e.g. `https://swift.example.com/v1/AUTH_tenant`.
    pub url: String,
    pub token: String,
}

impl ObjectStoreService {
    /// Url of `container` under the storage account. The name is escaped
    /// as one path segment, so `?`, `#`, `/` and spaces stay in the name.
    pub fn container_url(&self, container: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid storage url {}: {}", self.url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse(format!("Storage url {} cannot take a path", self.url)))?
            .pop_if_empty()
            .push(container);
        Ok(url)
    }
}

impl std::fmt::Debug for ObjectStoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreService")
            .field("name", &self.name)
            .field("region", &self.region)
            .field("url_type", &self.url_type)
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A named container within the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub object_count: u64,
    pub bytes_used: u64,
}

impl Container {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(url: &str) -> ObjectStoreService {
        ObjectStoreService {
            name: "swift".to_string(),
            region: None,
            url_type: UrlType::Public,
            url: url.to_string(),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_container_url_joins_cleanly() {
        let service = service("https://swift.example.com/v1/AUTH_t/");
        assert_eq!(
            service.container_url("owncloud").expect("url").as_str(),
            "https://swift.example.com/v1/AUTH_t/owncloud"
        );
        assert!(format!("{:?}", service).contains("<redacted>"));
    }

    #[test]
    fn test_container_url_escapes_name() {
        let service = service("https://swift.example.com/v1/AUTH_t");

        let url = service.container_url("a?b").expect("url");
        assert_eq!(url.path(), "/v1/AUTH_t/a%3Fb");
        assert_eq!(url.query(), None);

        let url = service.container_url("my files/2024#1").expect("url");
        assert_eq!(url.path(), "/v1/AUTH_t/my%20files%2F2024%231");
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_container_url_rejects_bad_storage_url() {
        let err = service("not a url").container_url("files").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
