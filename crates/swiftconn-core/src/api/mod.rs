//! REST client module for the identity and object-store services.
//!
//! This module provides the `OpenStackApi` trait the connection factory
//! drives, its reqwest implementation `HttpClient`, and `ApiError` for
//! transport and HTTP status failures.
//!
//! Authentication uses the Keystone v2 password flow; container requests
//! carry the issued token in `X-Auth-Token`.

pub mod client;
pub mod error;

pub use client::{ClientBuilder, HttpClient, HttpClientBuilder, OpenStackApi};
pub use error::ApiError;
