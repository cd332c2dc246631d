use reqwest::Url;
use thiserror::Error;

/// Failure talking to the identity or object-store endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Connection refused by {host}: {message}")]
    Connect { host: String, message: String },

    #[error("Timed out waiting for {host}: {message}")]
    Timeout { host: String, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            412 => ApiError::PreconditionFailed(truncated),
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::ServerError { status: code, body: truncated },
            code => ApiError::Status { status: code, body: truncated },
        }
    }

    /// Classify a transport failure, attributing it to the request's host.
    /// `fallback` is used when reqwest did not record the url.
    pub fn from_transport(err: reqwest::Error, fallback: &str) -> Self {
        let host = err
            .url()
            .map(host_port)
            .or_else(|| Url::parse(fallback).ok().as_ref().map(host_port))
            .unwrap_or_else(|| fallback.to_string());

        if err.is_connect() {
            ApiError::Connect { host, message: err.to_string() }
        } else if err.is_timeout() {
            ApiError::Timeout { host, message: err.to_string() }
        } else {
            ApiError::NetworkError(err)
        }
    }

    /// HTTP status behind this error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::PreconditionFailed(_) => Some(412),
            ApiError::RateLimited => Some(429),
            ApiError::ServerError { status, .. } | ApiError::Status { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            ApiError::Connect { .. } | ApiError::Timeout { .. } | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// `host:port` of the endpoint when the request never reached a server.
    pub fn unreachable_host(&self) -> Option<&str> {
        match self {
            ApiError::Connect { host, .. } | ApiError::Timeout { host, .. } => Some(host),
            _ => None,
        }
    }
}

/// Render a url's authority as `host:port`, filling in the scheme's default port.
pub fn host_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
