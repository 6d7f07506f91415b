//! Persistence media for the store blob.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::StoreError;
use crate::db::{kv_repo, Database};

/// A key-value slot holding the serialized store.
pub trait StorageBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// Process-local backend. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Memory backend lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.slots().insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// SQLite-backed slot in the `kv_store` table.
#[derive(Clone)]
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(path)?))
    }
}

impl StorageBackend for SqliteBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(kv_repo::get(&self.db, key)?)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let revision = kv_repo::put(&self.db, key, blob)?;
        log::debug!("Saved '{}' ({} bytes, revision {})", key, blob.len(), revision);
        Ok(())
    }
}
