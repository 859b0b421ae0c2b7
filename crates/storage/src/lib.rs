//! Storage layer for Maternal Companion
//!
//! This crate provides the persisted key-value store that holds the session
//! (access token, refresh token, user profile) and the launch flags read by
//! the splash screen.
//!
//! Two backends implement [`SessionStore`]:
//! - [`KvStore`] - sled-backed, survives restarts
//! - [`MemoryStore`] - process-local, used in tests and previews

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod memory;
pub mod session;

pub use kv::{KvConfig, KvStore};
pub use memory::MemoryStore;
pub use session::{SessionStore, StorageKey, SESSION_KEYS};

use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
