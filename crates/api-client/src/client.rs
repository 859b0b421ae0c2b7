//! API client
//!
//! [`ApiClient`] owns the transport stack and exposes typed JSON helpers and
//! the auth endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use api_client::{ApiClient, ClientConfig, RefreshError};
//! use std::sync::Arc;
//! use storage::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let client = ApiClient::new(
//!         ClientConfig::from_env(),
//!         store,
//!         Arc::new(|_: &RefreshError| println!("session expired, back to login")),
//!     )?;
//!
//!     let login = client.login("ama@example.com", "secret").await?;
//!     client.configure_token(Some(&login.token));
//!
//!     let appointments: serde_json::Value = client.get("/appointments").await?;
//!     println!("{}", appointments);
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use storage::SessionStore;

use crate::auth::{AuthHeader, RefreshRetry, SessionExpiryHandler, SharedAuthHeader};
use crate::config::ClientConfig;
use crate::http::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::session::{LoginRequest, LoginResponse};
use crate::Result;

/// Authenticated API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    default_token: SharedAuthHeader,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client that talks HTTP to `config.base_url`
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        on_expired: Arc<dyn SessionExpiryHandler>,
    ) -> Result<Self> {
        let base = HttpTransport::new(config.clone())?;
        Ok(Self::with_transport(config, base, store, on_expired))
    }

    /// Create a client on top of any base transport
    ///
    /// The auth and refresh layers are composed around `base`.
    pub fn with_transport<T>(
        config: ClientConfig,
        base: T,
        store: Arc<dyn SessionStore>,
        on_expired: Arc<dyn SessionExpiryHandler>,
    ) -> Self
    where
        T: Transport + 'static,
    {
        let default_token = SharedAuthHeader::default();

        let refresh = RefreshRetry::new(
            base,
            store.clone(),
            default_token.clone(),
            on_expired,
            config.refresh_path.clone(),
        );
        let transport = AuthHeader::new(refresh, store, default_token.clone());

        Self {
            transport: Arc::new(transport),
            default_token,
            config,
        }
    }

    /// Set or clear the default Authorization token
    ///
    /// A token persisted in the session store still takes precedence.
    pub fn configure_token(&self, token: Option<&str>) {
        let token = token.filter(|t| !t.is_empty()).map(str::to_string);
        if token.is_some() {
            tracing::debug!("default auth header set");
        } else {
            tracing::debug!("default auth header cleared");
        }
        *self.default_token.write() = token;
    }

    /// The default Authorization header value, if set
    pub fn auth_header(&self) -> Option<String> {
        self.default_token
            .read()
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a raw request through the auth stack
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(ApiRequest::get(path)).await?.json()
    }

    /// POST a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).json_body(body)?;
        self.request(request).await?.json()
    }

    /// PUT a JSON body
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::put(path).json_body(body)?;
        self.request(request).await?.json()
    }

    /// DELETE a resource
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(ApiRequest::delete(path)).await?.json()
    }

    /// Log in with email and password
    ///
    /// Persisting the returned tokens is left to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post(&self.config.login_path, &body).await
    }

    /// Tell the backend the session is over
    pub async fn logout(&self) -> Result<()> {
        let request = ApiRequest::post(&self.config.logout_path);
        self.request(request).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("has_default_token", &self.default_token.read().is_some())
            .finish()
    }
}
