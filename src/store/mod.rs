//! Persisted key-value store abstraction
//!
//! The session state machine and the API client only ever see the
//! [`KeyValueStore`] trait: a synchronous get/set/remove by string key with
//! no transactional guarantees. Two backends are provided:
//!
//! - [`MemoryStore`] -- an in-process map, used by tests and embedders that
//!   manage persistence themselves.
//! - [`SledStore`] -- an embedded `sled` database on disk, used by the CLI.
//!
//! Concurrent writers are last-write-wins; there is no compare-and-swap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, VoxdashError};

pub mod sled_store;
pub use sled_store::SledStore;

/// Access token issued by `/auth/login` or `/auth/refresh`.
pub const TOKEN_KEY: &str = "token";

/// Refresh token issued by `/auth/login`.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// JSON array of chat messages for the current analysis.
pub const CONVERSATION_STORAGE_KEY: &str = "voice_analysis_conversation";

/// JSON-encoded session record driving the dashboard mode.
pub const SESSION_STATE_KEY: &str = "dashboard_session_state";

/// Opaque, synchronous string key-value store.
///
/// Implementations must treat `remove` of a missing key as a no-op so that
/// every mutator built on top stays idempotent.
///
/// # Examples
///
/// ```
/// use voxdash::store::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("token", "abc").unwrap();
/// assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
/// store.remove("token").unwrap();
/// assert!(store.get("token").unwrap().is_none());
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// Returns `true` when a value exists under `key`.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory [`KeyValueStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| VoxdashError::Storage("memory store lock poisoned".to_string()).into())
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns `true` when the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
