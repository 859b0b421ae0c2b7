//! Authentication context
//!
//! [`AuthContext`] ties the session store, the API client and the
//! [`Navigator`] together: it persists the session on login, tears it down on
//! logout, records onboarding completion, and restores a stored session at
//! start-up. When the API client gives up on a session, the context drops the
//! in-memory user and sends the navigator back to the login screen.

use api_client::{
    ApiClient, ApiError, ClientConfig, RefreshError, SessionExpiryHandler, Transport, UserProfile,
};
use app_ui::Screen;
use parking_lot::RwLock;
use std::sync::Arc;
use storage::{SessionStore, StorageKey, StoreError, SESSION_KEYS};
use thiserror::Error;

use crate::navigator::Navigator;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// API call failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Stored user profile could not be encoded or decoded
    #[error("User profile encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The login response carried no access token
    #[error("Login response did not contain an access token")]
    MissingToken,
}

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

type SharedUser = Arc<RwLock<Option<UserProfile>>>;

/// Sends the user back to login when the API client ends the session
struct ExpiryRedirect {
    store: Arc<dyn SessionStore>,
    navigator: Navigator,
    user: SharedUser,
}

impl SessionExpiryHandler for ExpiryRedirect {
    fn session_expired(&self, reason: &RefreshError) {
        tracing::info!(reason = %reason, "session expired, redirecting to login");
        if let Err(e) = self.store.clear(&SESSION_KEYS) {
            tracing::warn!(error = %e, "failed to clear expired session");
        }
        *self.user.write() = None;
        self.navigator.reset(Screen::Auth);
    }
}

/// Session state for the running app
///
/// Clones share state.
#[derive(Clone)]
pub struct AuthContext {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    navigator: Navigator,
    user: SharedUser,
}

impl AuthContext {
    /// Create a context talking HTTP to `config.base_url`
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Navigator,
    ) -> Result<Self> {
        let user = SharedUser::default();
        let redirect = Arc::new(ExpiryRedirect {
            store: store.clone(),
            navigator: navigator.clone(),
            user: user.clone(),
        });
        let client = ApiClient::new(config, store.clone(), redirect)?;

        Ok(Self {
            client,
            store,
            navigator,
            user,
        })
    }

    /// Create a context on top of any base transport
    pub fn with_transport<T>(
        config: ClientConfig,
        base: T,
        store: Arc<dyn SessionStore>,
        navigator: Navigator,
    ) -> Self
    where
        T: Transport + 'static,
    {
        let user = SharedUser::default();
        let redirect = Arc::new(ExpiryRedirect {
            store: store.clone(),
            navigator: navigator.clone(),
            user: user.clone(),
        });
        let client = ApiClient::with_transport(config, base, store.clone(), redirect);

        Self {
            client,
            store,
            navigator,
            user,
        }
    }

    /// The API client, with the session's auth handling attached
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The navigator this context redirects
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// The logged-in user, if known
    pub fn user(&self) -> Option<UserProfile> {
        self.user.read().clone()
    }

    /// Check if an access token is stored
    pub fn is_authenticated(&self) -> bool {
        match self.store.get(StorageKey::AccessToken) {
            Ok(token) => token.is_some_and(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "session store read failed");
                false
            }
        }
    }

    /// Log in and move to the screen the new session belongs on
    ///
    /// Returns the screen navigated to.
    pub async fn login(&self, email: &str, password: &str) -> Result<Screen> {
        let response = self.client.login(email, password).await?;
        if response.token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.store.set(StorageKey::AccessToken, &response.token)?;
        if let Some(refresh) = response.refresh_token() {
            self.store.set(StorageKey::RefreshToken, refresh)?;
        }
        match &response.user {
            Some(user) => {
                self.store
                    .set(StorageKey::User, &serde_json::to_string(user)?)?;
                self.store.set(StorageKey::UserType, user.role.as_str())?;
            }
            None => {
                self.store.remove(StorageKey::User)?;
                self.store.remove(StorageKey::UserType)?;
            }
        }

        self.client.configure_token(Some(&response.token));
        *self.user.write() = response.user.clone();

        let target = self.navigator.launch_screen();
        self.navigator.navigate_or_reset(target);

        tracing::info!(
            user_id = response.user.as_ref().map(|u| u.id.as_str()).unwrap_or("unknown"),
            screen = %target,
            "logged in"
        );
        Ok(target)
    }

    /// End the session
    ///
    /// The backend is told first; a failure there is logged and ignored. The
    /// stored session is then removed and the navigator reset to login. The
    /// onboarding flags stay, so a returning user skips onboarding.
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self.client.logout().await {
            tracing::warn!(error = %e, "logout request failed, clearing session anyway");
        }

        let cleared = self.store.clear(&SESSION_KEYS);
        self.client.configure_token(None);
        *self.user.write() = None;
        self.navigator.reset(Screen::Auth);

        tracing::info!("logged out");
        cleared.map_err(AuthError::from)
    }

    /// Record general onboarding as done and go to the dashboard
    pub fn complete_onboarding(&self) -> Result<Screen> {
        self.store.set_flag(StorageKey::OnboardingComplete, true)?;
        Ok(self.navigator.navigate_or_reset(Screen::Dashboard))
    }

    /// Record provider onboarding as done and go to the provider dashboard
    pub fn complete_provider_onboarding(&self) -> Result<Screen> {
        self.store
            .set_flag(StorageKey::ProviderOnboardingComplete, true)?;
        Ok(self.navigator.navigate_or_reset(Screen::ProviderDashboard))
    }

    /// Load a stored session
    ///
    /// Sets the default auth header from the stored token and the in-memory
    /// user from the stored profile. A profile that no longer decodes is
    /// dropped from the store.
    pub fn restore(&self) -> Result<Option<UserProfile>> {
        let token = self
            .store
            .get(StorageKey::AccessToken)?
            .filter(|t| !t.is_empty());
        self.client.configure_token(token.as_deref());

        if token.is_none() {
            *self.user.write() = None;
            return Ok(None);
        }

        let user = match self.store.get(StorageKey::User)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable stored user");
                    self.store.remove(StorageKey::User)?;
                    None
                }
            },
            None => None,
        };

        tracing::debug!(has_user = user.is_some(), "session restored");
        *self.user.write() = user.clone();
        Ok(user)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("client", &self.client)
            .field("user", &self.user.read().as_ref().map(|u| u.id.clone()))
            .finish()
    }
}
