//! Authentication module for identity sessions and credentials.
//!
//! This module provides:
//! - `Credentials`: username, password and tenant for the identity service
//! - `Session`: a token plus the service catalog it was issued with
//! - `SessionManager`: token reuse through a `TokenCache`, re-authenticating
//!   when the cached token is missing, unreadable or expired

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{Session, SessionManager};
