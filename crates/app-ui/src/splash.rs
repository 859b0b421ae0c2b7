//! Splash screen auto-advance
//!
//! The splash screen waits a fixed delay and then moves to the screen the
//! stored session points at. The wait is a spawned tokio task so that it can
//! be aborted when the user leaves the splash screen first.

use std::time::Duration;
use storage::{SessionStore, StorageKey};
use tokio::task::JoinHandle;

use crate::navigation::Screen;

/// Default time the splash screen stays up
pub const DEFAULT_SPLASH_DELAY: Duration = Duration::from_millis(2500);

/// Environment variable overriding the splash delay, in milliseconds
pub const SPLASH_DELAY_ENV: &str = "MATERNAL_SPLASH_DELAY_MS";

/// Splash screen configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashConfig {
    /// How long the splash screen is shown
    pub delay: Duration,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_SPLASH_DELAY,
        }
    }
}

impl SplashConfig {
    /// Create a config with the given delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Read the delay from the environment, falling back to the default
    pub fn from_env() -> Self {
        match std::env::var(SPLASH_DELAY_ENV) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Self::new(Duration::from_millis(ms)),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid {}", SPLASH_DELAY_ENV);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

/// Pick the screen the splash screen advances to
///
/// Without an access token this is the welcome screen. Otherwise the stored
/// role and onboarding flags decide between the onboarding flows and the
/// role hubs. Store read failures count as missing values.
pub fn resolve_launch_screen(store: &dyn SessionStore) -> Screen {
    let read = |key: StorageKey| match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "session store read failed");
            None
        }
    };
    let flag = |key: StorageKey| read(key).as_deref() == Some("true");

    if read(StorageKey::AccessToken).is_none() {
        return Screen::Welcome;
    }

    match read(StorageKey::UserType).as_deref() {
        Some("provider") if flag(StorageKey::ProviderOnboardingComplete) => {
            Screen::ProviderDashboard
        }
        Some("provider") => Screen::ProviderOnboarding,
        Some("chw") => Screen::ChwDashboard,
        _ if flag(StorageKey::OnboardingComplete) => Screen::Dashboard,
        _ => Screen::Onboarding,
    }
}

/// One-shot splash timer
///
/// Runs `on_fire` once after the delay. Dropping or cancelling the timer
/// before then means `on_fire` never runs. Must be started inside a tokio
/// runtime.
#[derive(Debug)]
pub struct SplashTimer {
    handle: JoinHandle<()>,
}

impl SplashTimer {
    /// Start the timer
    pub fn start<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        Self { handle }
    }

    /// Stop the timer if it has not fired yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Check if the timer fired or was cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SplashTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
