//! Session store interface
//!
//! The HTTP client, the auth context and the splash screen all share one
//! string-keyed store. Keys are fixed so that a session written by one
//! component can be read back by any other, including after a restart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Result, StoreError};

/// Fixed keys in the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    /// Short-lived access token
    AccessToken,
    /// Longer-lived refresh token
    RefreshToken,
    /// JSON-encoded user profile
    User,
    /// Role flag (`mother`, `provider` or `chw`)
    UserType,
    /// General onboarding has been completed
    OnboardingComplete,
    /// Provider onboarding has been completed
    ProviderOnboardingComplete,
}

/// Keys removed when a session ends
pub const SESSION_KEYS: [StorageKey; 4] = [
    StorageKey::AccessToken,
    StorageKey::RefreshToken,
    StorageKey::User,
    StorageKey::UserType,
];

impl StorageKey {
    /// Get the persisted key name
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "token",
            StorageKey::RefreshToken => "refreshToken",
            StorageKey::User => "user",
            StorageKey::UserType => "userType",
            StorageKey::OnboardingComplete => "onboardingComplete",
            StorageKey::ProviderOnboardingComplete => "providerOnboardingComplete",
        }
    }

    /// Get all keys
    pub fn all() -> [StorageKey; 6] {
        [
            StorageKey::AccessToken,
            StorageKey::RefreshToken,
            StorageKey::User,
            StorageKey::UserType,
            StorageKey::OnboardingComplete,
            StorageKey::ProviderOnboardingComplete,
        ]
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        StorageKey::all()
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StoreError::InvalidKey(s.to_string()))
    }
}

/// Key-value persistence for session state
///
/// Implementations must be safe to share between the HTTP client and the
/// UI state; last write wins.
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: StorageKey) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: StorageKey, value: &str) -> Result<()>;

    /// Remove a value (removing a missing key is not an error)
    fn remove(&self, key: StorageKey) -> Result<()>;

    /// Remove several values
    fn clear(&self, keys: &[StorageKey]) -> Result<()> {
        for key in keys {
            self.remove(*key)?;
        }
        Ok(())
    }

    /// Read a boolean flag; anything but `"true"` is false
    fn flag(&self, key: StorageKey) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some("true"))
    }

    /// Write a boolean flag
    fn set_flag(&self, key: StorageKey, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_stable() {
        assert_eq!(StorageKey::AccessToken.as_str(), "token");
        assert_eq!(StorageKey::RefreshToken.as_str(), "refreshToken");
        assert_eq!(StorageKey::UserType.as_str(), "userType");
        assert_eq!(
            StorageKey::ProviderOnboardingComplete.to_string(),
            "providerOnboardingComplete"
        );
    }

    #[test]
    fn test_key_from_str() {
        for key in StorageKey::all() {
            assert_eq!(key.as_str().parse::<StorageKey>().unwrap(), key);
        }
        assert!("nope".parse::<StorageKey>().is_err());
    }

    #[test]
    fn test_session_keys_keep_onboarding_flags() {
        assert!(!SESSION_KEYS.contains(&StorageKey::OnboardingComplete));
        assert!(!SESSION_KEYS.contains(&StorageKey::ProviderOnboardingComplete));
    }
}
