//! Maternal companion app core
//!
//! Wires the session store, the authenticated API client, the navigator and
//! the auth context into one [`CompanionApp`].
//!
//! # Example
//!
//! ```rust,no_run
//! use maternal_companion::{init_tracing, AppConfig, CompanionApp};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init_tracing();
//!
//!     let app = CompanionApp::start(AppConfig::from_env())?;
//!     println!("showing {}", app.navigator().current());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::Context;
use std::sync::Arc;

pub use api_client::{ApiClient, ApiError, ClientConfig};
pub use app_state::{AuthContext, AuthError, Navigator};
pub use app_ui::{Screen, SplashConfig};
pub use storage::{KvConfig, KvStore, MemoryStore, SessionStore, StorageKey};

/// Environment variable overriding the session database path
pub const DB_PATH_ENV: &str = "MATERNAL_DB_PATH";

/// Where the session is kept
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// On-disk sled database
    Sled(KvConfig),
    /// Process memory; lost on exit
    Memory,
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API client settings
    pub client: ClientConfig,
    /// Splash screen settings
    pub splash: SplashConfig,
    /// Session store
    pub store: StoreBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            splash: SplashConfig::default(),
            store: StoreBackend::Sled(KvConfig::default()),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables
    pub fn from_env() -> Self {
        let store = match std::env::var(DB_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => StoreBackend::Sled(KvConfig::new(path.trim())),
            _ => StoreBackend::Sled(KvConfig::default()),
        };

        Self {
            client: ClientConfig::from_env(),
            splash: SplashConfig::from_env(),
            store,
        }
    }

    /// Same settings, but keep the session in memory
    pub fn in_memory(mut self) -> Self {
        self.store = StoreBackend::Memory;
        self
    }
}

/// The running app
#[derive(Debug, Clone)]
pub struct CompanionApp {
    navigator: Navigator,
    auth: AuthContext,
}

impl CompanionApp {
    /// Open the store, restore any saved session and show the splash screen
    ///
    /// Must be called inside a tokio runtime for the splash screen to
    /// advance on its own.
    pub fn start(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn SessionStore> = match &config.store {
            StoreBackend::Sled(kv) => Arc::new(
                KvStore::new(kv.clone())
                    .with_context(|| format!("failed to open session store at {}", kv.path))?,
            ),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Start on an existing store
    pub fn with_store(config: AppConfig, store: Arc<dyn SessionStore>) -> anyhow::Result<Self> {
        let navigator = Navigator::new(store.clone(), config.splash);
        let auth = AuthContext::new(config.client, store, navigator.clone())
            .context("failed to build API client")?;

        let user = auth.restore().context("failed to restore session")?;
        tracing::info!(
            restored = user.is_some(),
            authenticated = auth.is_authenticated(),
            "app starting"
        );

        navigator.start();
        Ok(Self { navigator, auth })
    }

    /// The shared navigator
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// The auth context
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// The authenticated API client
    pub fn client(&self) -> &ApiClient {
        self.auth.client()
    }
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it again is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.client.base_url, "http://localhost:5000/api");
        assert!(matches!(config.store, StoreBackend::Sled(_)));
        assert!(matches!(config.in_memory().store, StoreBackend::Memory));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
