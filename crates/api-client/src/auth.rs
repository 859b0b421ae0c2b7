//! Authentication layers
//!
//! [`AuthHeader`] and [`RefreshRetry`] decorate an inner [`Transport`]:
//!
//! - `AuthHeader` reads the persisted access token before every request, so a
//!   token rotated by a refresh is used by the very next request.
//! - `RefreshRetry` turns a first 401 into one refresh call and one resend of
//!   the original request. The refresh call and the resend both go straight
//!   to the inner transport, which never refreshes, so a request is retried
//!   at most once and a 401 from the refresh endpoint cannot loop.
//!
//! When the refresh fails the persisted tokens are removed, the
//! [`SessionExpiryHandler`] is told (the app redirects to login) and the
//! caller gets [`ApiError::SessionExpired`] carrying the refresh failure.
//!
//! Concurrent requests that hit a 401 at the same time each refresh on their
//! own; refreshes are not coalesced.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use storage::{SessionStore, StorageKey, StoreError, SESSION_KEYS};
use thiserror::Error;

use crate::http::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::session::{RefreshRequest, RefreshResponse};

/// Default access token shared by the client and the refresh layer
pub type SharedAuthHeader = Arc<RwLock<Option<String>>>;

/// Why a token refresh failed
#[derive(Debug, Error)]
pub enum RefreshError {
    /// No refresh token is stored
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The refresh endpoint returned an error or could not be reached
    #[error("refresh request failed: {0}")]
    Request(#[source] Box<ApiError>),

    /// The refresh response carried no usable access token
    #[error("refresh response did not contain an access token")]
    MissingAccessToken,

    /// Reading or writing the session store failed
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl RefreshError {
    /// The HTTP status of the failed refresh call, if it got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            RefreshError::Request(err) => err.status(),
            _ => None,
        }
    }
}

/// Receives notice that the session is gone
///
/// Called after the persisted tokens have been removed; implementations
/// redirect the user to the login screen.
#[cfg_attr(test, mockall::automock)]
pub trait SessionExpiryHandler: Send + Sync {
    /// The access token could not be refreshed
    fn session_expired(&self, reason: &RefreshError);
}

impl<F> SessionExpiryHandler for F
where
    F: Fn(&RefreshError) + Send + Sync,
{
    fn session_expired(&self, reason: &RefreshError) {
        self(reason)
    }
}

// =============================================================================
// Auth header layer
// =============================================================================

/// Attaches the bearer token to every outgoing request
pub struct AuthHeader<T> {
    inner: T,
    store: Arc<dyn SessionStore>,
    default_token: SharedAuthHeader,
}

impl<T: Transport> AuthHeader<T> {
    /// Wrap a transport
    pub fn new(inner: T, store: Arc<dyn SessionStore>, default_token: SharedAuthHeader) -> Self {
        Self {
            inner,
            store,
            default_token,
        }
    }

    /// Pick the token for the next request: persisted first, then the
    /// configured default
    fn current_token(&self) -> Result<Option<String>, ApiError> {
        let persisted = self
            .store
            .get(StorageKey::AccessToken)?
            .filter(|token| !token.is_empty());

        Ok(persisted.or_else(|| self.default_token.read().clone()))
    }
}

#[async_trait]
impl<T: Transport> Transport for AuthHeader<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = match self.current_token()? {
            Some(token) => request.bearer(&token),
            None => request,
        };
        self.inner.send(request).await
    }
}

// =============================================================================
// Refresh-and-retry layer
// =============================================================================

/// Refreshes the access token once on a 401 and resends the request once
pub struct RefreshRetry<T> {
    inner: T,
    store: Arc<dyn SessionStore>,
    default_token: SharedAuthHeader,
    on_expired: Arc<dyn SessionExpiryHandler>,
    refresh_path: String,
}

impl<T: Transport> RefreshRetry<T> {
    /// Wrap a transport
    pub fn new(
        inner: T,
        store: Arc<dyn SessionStore>,
        default_token: SharedAuthHeader,
        on_expired: Arc<dyn SessionExpiryHandler>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            store,
            default_token,
            on_expired,
            refresh_path: refresh_path.into(),
        }
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// The new token is persisted and becomes the default header. The call
    /// goes to the inner transport and is never itself refreshed.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .store
            .get(StorageKey::RefreshToken)?
            .filter(|token| !token.is_empty())
            .ok_or(RefreshError::MissingRefreshToken)?;

        let request = ApiRequest::post(&self.refresh_path)
            .json_body(&RefreshRequest {
                token: &refresh_token,
            })
            .map_err(|e| RefreshError::Request(Box::new(e.into())))?;

        let response = self
            .inner
            .send(request)
            .await
            .map_err(|e| RefreshError::Request(Box::new(e)))?;

        let body: RefreshResponse = response
            .json::<Option<RefreshResponse>>()
            .map_err(|e| RefreshError::Request(Box::new(e)))?
            .unwrap_or_default();

        let token = body
            .access_token()
            .ok_or(RefreshError::MissingAccessToken)?
            .to_string();

        self.store.set(StorageKey::AccessToken, &token)?;
        if let Some(rotated) = body.refresh_token() {
            self.store.set(StorageKey::RefreshToken, rotated)?;
        }
        *self.default_token.write() = Some(token.clone());

        tracing::info!("access token refreshed");
        Ok(token)
    }

    /// End the session after a failed refresh
    fn expire(&self, reason: RefreshError) -> ApiError {
        tracing::warn!(error = %reason, "token refresh failed, ending session");

        if let Err(err) = self.store.clear(&SESSION_KEYS) {
            tracing::warn!(error = %err, "failed to clear stored session");
        }
        *self.default_token.write() = None;

        self.on_expired.session_expired(&reason);
        ApiError::SessionExpired(reason)
    }
}

#[async_trait]
impl<T: Transport> Transport for RefreshRetry<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match self.inner.send(request.clone()).await {
            Err(err) if err.is_unauthorized() => {
                tracing::debug!(path = %request.path, "access token rejected");
            }
            other => return other,
        }

        let token = match self.refresh().await {
            Ok(token) => token,
            Err(reason) => return Err(self.expire(reason)),
        };

        // Single resend; whatever it yields goes back to the caller.
        self.inner.send(request.bearer(&token)).await
    }
}

// =============================================================================
// Tests
// =============================================================================
