//! On-disk key-value store backed by `sled`
//!
//! Values are stored as UTF-8 bytes under their string key. Every write is
//! flushed so that a crash between CLI invocations never loses a session
//! transition.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Result, VoxdashError};
use crate::store::KeyValueStore;

/// Persistent [`KeyValueStore`] using an embedded `sled` database.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database directory
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use voxdash::store::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> voxdash::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("state.db"))?;
    /// store.set("token", "abc")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .map_err(|e| VoxdashError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Default database location in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` when no home directory can be resolved
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "voxdash", "voxdash").ok_or_else(|| {
            VoxdashError::Storage("Could not determine data directory".to_string())
        })?;
        Ok(proj_dirs.data_dir().join("state.db"))
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| VoxdashError::Storage(format!("Get failed: {}", e)))?;

        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    VoxdashError::Storage(format!("Value for '{}' is not UTF-8: {}", key, e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| VoxdashError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| VoxdashError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }
}

impl SledStore {
    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| VoxdashError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SESSION_STATE_KEY, TOKEN_KEY};
    use tempfile::TempDir;

    fn open_temp() -> (SledStore, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let store = SledStore::open(dir.path().join("state.db")).expect("open sled");
        (store, dir)
    }

    #[test]
    fn test_set_get_remove() {
        let (store, _dir) = open_temp();
        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let (store, _dir) = open_temp();
        assert!(store.remove(SESSION_STATE_KEY).is_ok());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = SledStore::open(&path).unwrap();
            store.set(SESSION_STATE_KEY, r#"{"isActive":true}"#).unwrap();
        }
        let store = SledStore::open(&path).unwrap();
        assert_eq!(
            store.get(SESSION_STATE_KEY).unwrap().as_deref(),
            Some(r#"{"isActive":true}"#)
        );
    }

    #[test]
    fn test_non_utf8_value_is_storage_error() {
        let (store, _dir) = open_temp();
        store.db.insert(TOKEN_KEY.as_bytes(), &[0xff, 0xfe][..]).unwrap();
        let err = store.get(TOKEN_KEY).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VoxdashError>(),
            Some(VoxdashError::Storage(_))
        ));
    }
}
