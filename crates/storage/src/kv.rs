//! Key-value store for session state and launch flags
//!
//! This module provides a small type-safe key-value store on top of sled.
//! Session values live under the `session` scope so that other data can
//! share the same database without colliding with the fixed session keys.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::sync::Arc;

use crate::session::{SessionStore, StorageKey};
use crate::Result;

const SESSION_SCOPE: &str = "session";

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Background flush interval in milliseconds (None keeps sled's default)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "maternal_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Key-value store implementation
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Db>,
    separator: &'static str,
}

impl KvStore {
    /// Open a key-value store with configuration
    pub fn new(config: KvConfig) -> Result<Self> {
        let mut db_config = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression);

        if let Some(ms) = config.flush_every_ms {
            db_config = db_config.flush_every_ms(Some(ms));
        }

        let db = db_config.open()?;
        tracing::debug!(path = %config.path, "opened key-value store");

        Ok(Self { db: Arc::new(db), separator: ":" })
    }

    /// Get a value by scoped key (e.g., ["session", "token"])
    pub fn get_scoped<T>(&self, scopes: &[&str]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = scopes.join(self.separator);
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value by scoped key
    pub fn set_scoped<T>(&self, scopes: &[&str], value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = scopes.join(self.separator);
        self.db.insert(key.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Remove a value by scoped key, reporting whether it existed
    pub fn remove_scoped(&self, scopes: &[&str]) -> Result<bool> {
        let key = scopes.join(self.separator);
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl SessionStore for KvStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        self.get_scoped(&[SESSION_SCOPE, key.as_str()])
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.set_scoped(&[SESSION_SCOPE, key.as_str()], value)
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        self.remove_scoped(&[SESSION_SCOPE, key.as_str()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_KEYS;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        week: i32,
    }

    fn temp_store() -> KvStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        KvStore { db: Arc::new(db), separator: ":" }
    }

    #[test]
    fn test_scoped_struct_values() {
        let kv = temp_store();

        let data = TestData { name: "Ama".to_string(), week: 24 };
        kv.set_scoped(&["profile", "u1"], &data).unwrap();

        let retrieved: Option<TestData> = kv.get_scoped(&["profile", "u1"]).unwrap();
        assert_eq!(retrieved, Some(data));

        assert!(kv.remove_scoped(&["profile", "u1"]).unwrap());
        assert!(!kv.remove_scoped(&["profile", "u1"]).unwrap());
        assert_eq!(kv.get_scoped::<TestData>(&["profile", "u1"]).unwrap(), None);
    }

    #[test]
    fn test_session_values_are_scoped() {
        let kv = temp_store();

        SessionStore::set(&kv, StorageKey::AccessToken, "tok1").unwrap();

        let raw: Option<String> = kv.get_scoped(&["session", "token"]).unwrap();
        assert_eq!(raw, Some("tok1".to_string()));
        assert_eq!(kv.get_scoped::<String>(&["token"]).unwrap(), None);
    }

    #[test]
    fn test_session_store_round_trip() {
        let kv = temp_store();

        kv.set_flag(StorageKey::OnboardingComplete, true).unwrap();
        SessionStore::set(&kv, StorageKey::RefreshToken, "r1").unwrap();

        assert!(kv.flag(StorageKey::OnboardingComplete).unwrap());
        assert!(!kv.flag(StorageKey::ProviderOnboardingComplete).unwrap());
        assert_eq!(
            SessionStore::get(&kv, StorageKey::RefreshToken).unwrap(),
            Some("r1".to_string())
        );

        kv.clear(&SESSION_KEYS).unwrap();
        assert_eq!(SessionStore::get(&kv, StorageKey::RefreshToken).unwrap(), None);
        assert!(kv.flag(StorageKey::OnboardingComplete).unwrap());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv").to_string_lossy().into_owned();

        {
            let kv = KvStore::new(KvConfig::new(&path).flush_every_ms(None)).unwrap();
            SessionStore::set(&kv, StorageKey::AccessToken, "persisted").unwrap();
            kv.flush().unwrap();
        }

        let kv = KvStore::new(KvConfig::new(&path)).unwrap();
        assert_eq!(
            SessionStore::get(&kv, StorageKey::AccessToken).unwrap(),
            Some("persisted".to_string())
        );
    }

    #[test]
    fn test_config_builder() {
        let config = KvConfig::new("custom.db")
            .cache_capacity(1024)
            .use_compression(false)
            .flush_every_ms(None);

        assert_eq!(config.path, "custom.db");
        assert_eq!(config.cache_capacity, 1024);
        assert!(!config.use_compression);
        assert_eq!(config.flush_every_ms, None);
    }
}
