//! Authenticated HTTP client for Maternal Companion
//!
//! Every request is sent through a small stack of [`Transport`] layers:
//!
//! ```text
//! AuthHeader -> RefreshRetry -> HttpTransport
//! ```
//!
//! - [`AuthHeader`] attaches `Authorization: Bearer <token>` using the token
//!   currently persisted in the [`storage::SessionStore`].
//! - [`RefreshRetry`] recovers from an expired access token by refreshing it
//!   once and re-sending the original request once.
//! - [`HttpTransport`] is the plain reqwest-backed sender.
//!
//! [`ApiClient`] composes the stack and exposes typed JSON helpers plus the
//! login, refresh and logout endpoints.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod http;
pub mod session;

pub use auth::{AuthHeader, RefreshError, RefreshRetry, SessionExpiryHandler, SharedAuthHeader};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use http::{ApiError, ApiRequest, ApiResponse, HttpMethod, HttpTransport, Transport};
pub use session::{LoginResponse, Role, UserProfile};

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
