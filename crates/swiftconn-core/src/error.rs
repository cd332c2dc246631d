//! Error types surfaced by the connection factory.
//!
//! Each failure lands in one of a few categories so callers can decide
//! between retrying, failing fast and asking for new credentials.

use thiserror::Error;

use crate::api::ApiError;
use crate::models::UrlType;

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Invalid or unsatisfiable configuration. Raised before network I/O where possible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required connection parameter: {0}")]
    MissingField(&'static str),

    #[error("Invalid url type '{0}', expected internalURL or publicURL")]
    InvalidUrlType(String),

    #[error("Service {service} is not available in region {region}, available regions: {available}")]
    RegionNotOffered {
        service: String,
        region: String,
        available: String,
    },
}

/// The identity service refused to issue a token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Precondition failed, verify the keystone url")]
    PreconditionFailed(#[source] ApiError),

    #[error("Authentication failed, verify the username, password and possibly tenant")]
    Rejected(#[source] ApiError),

    #[error("Unknown authentication error: {0}")]
    Unknown(#[source] ApiError),
}

impl AuthError {
    /// Classify an authentication failure by the status the identity service returned.
    pub fn from_api(err: ApiError) -> Self {
        match err.status() {
            Some(412) => AuthError::PreconditionFailed(err),
            Some(401) => AuthError::Rejected(err),
            _ => AuthError::Unknown(err),
        }
    }

    pub fn cause(&self) -> &ApiError {
        match self {
            AuthError::PreconditionFailed(e) | AuthError::Rejected(e) | AuthError::Unknown(e) => e,
        }
    }
}

/// The service catalog cannot satisfy the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Keystone did not provide a valid catalog, verify the credentials")]
    Empty,

    #[error("Service {service} not found in service catalog, available services: {available}")]
    ServiceNotFound { service: String, available: String },

    #[error("Service {service} has no {url_type} endpoint{}", region_suffix(.region))]
    EndpointNotFound {
        service: String,
        url_type: UrlType,
        region: Option<String>,
    },
}

fn region_suffix(region: &Option<String>) -> String {
    region
        .as_ref()
        .map(|r| format!(" in region {}", r))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Can't connect to object storage server at {host}")]
    Unavailable {
        host: String,
        #[source]
        source: ApiError,
    },

    /// Container request failed for a reason this crate does not interpret.
    #[error(transparent)]
    Storage(ApiError),

    #[error("Failed to construct storage client: {0}")]
    Client(#[source] ApiError),
}

/// Coarse grouping of `ConnectionError` for caller-side remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Fix the configuration; retrying will not help.
    Config,
    /// Credentials or identity endpoint need attention.
    Auth,
    /// The provider's catalog does not offer what was asked for.
    Catalog,
    /// Storage could not be reached; a retry may succeed.
    Availability,
    /// Original storage error, passed through unchanged.
    Passthrough,
}

impl ConnectionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConnectionError::Config(_) | ConnectionError::Client(_) => ErrorCategory::Config,
            ConnectionError::Auth(_) => ErrorCategory::Auth,
            ConnectionError::Catalog(_) => ErrorCategory::Catalog,
            ConnectionError::Unavailable { .. } => ErrorCategory::Availability,
            ConnectionError::Storage(_) => ErrorCategory::Passthrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_auth_error_status_mapping() {
        let precondition = AuthError::from_api(ApiError::from_status(StatusCode::PRECONDITION_FAILED, ""));
        assert!(matches!(precondition, AuthError::PreconditionFailed(_)));

        let rejected = AuthError::from_api(ApiError::from_status(StatusCode::UNAUTHORIZED, ""));
        assert!(matches!(rejected, AuthError::Rejected(_)));

        let unknown = AuthError::from_api(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
        assert!(matches!(unknown, AuthError::Unknown(_)));
        assert_eq!(unknown.cause().status(), Some(500));
        assert!(unknown.to_string().contains("boom"));
    }

    #[test]
    fn test_catalog_error_messages() {
        let err = CatalogError::ServiceNotFound {
            service: "missing".to_string(),
            available: "swift, other".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Service missing not found in service catalog, available services: swift, other"
        );

        let err = CatalogError::EndpointNotFound {
            service: "swift".to_string(),
            url_type: UrlType::Internal,
            region: Some("eu".to_string()),
        };
        assert_eq!(err.to_string(), "Service swift has no internalURL endpoint in region eu");
    }

    #[test]
    fn test_categories() {
        let unavailable = ConnectionError::Unavailable {
            host: "swift:8080".to_string(),
            source: ApiError::Connect {
                host: "swift:8080".to_string(),
                message: "refused".to_string(),
            },
        };
        assert_eq!(unavailable.category(), ErrorCategory::Availability);
        assert_eq!(
            unavailable.to_string(),
            "Can't connect to object storage server at swift:8080"
        );
        assert_eq!(
            ConnectionError::from(CatalogError::Empty).category(),
            ErrorCategory::Catalog
        );
        assert_eq!(
            ConnectionError::from(ConfigError::MissingField("url")).category(),
            ErrorCategory::Config
        );
    }
}
