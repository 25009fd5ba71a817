//! Key/value storage abstraction and backends.

/// In-memory backend.
pub mod memory;
/// SQLite backend.
pub mod sqlite;

use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Any other storage failure.
    #[error("{0}")]
    Message(String),
}

/// Result alias for storage calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Storage keys shared by every backend.
pub mod keys {
    /// Current multi-table collection.
    pub const TABLES: &str = "karasu-tables";
    /// Copy of a tables record that could not be loaded.
    pub const TABLES_BACKUP: &str = "karasu-tables-backup";
    /// Single-table photo counts from before multi-table support.
    pub const LEGACY_PHOTOS: &str = "sortedPhotos20250716";
    /// Global enablement overrides from before multi-table support.
    pub const LEGACY_GROUP_STATE: &str = "karasu-group-state";
    /// Locale preference; survives a full data wipe.
    pub const LOCALE: &str = "karasu-locale";
}

/// String key/value store with browser local-storage semantics.
pub trait KvStore: Send {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> PersistResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> PersistResult<()>;
    /// Removes `key`; absent keys are not an error.
    fn remove(&mut self, key: &str) -> PersistResult<()>;
    /// Every stored key.
    fn keys(&self) -> PersistResult<Vec<String>>;
    /// Makes previous writes durable.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}

/// Keys owned by this crate that a full data wipe removes. The locale
/// preference is not among them.
pub const TRACKED_KEYS: [&str; 4] = [
    keys::TABLES,
    keys::TABLES_BACKUP,
    keys::LEGACY_PHOTOS,
    keys::LEGACY_GROUP_STATE,
];

/// Removes every tracked key, keeping the locale preference and any keys
/// this crate does not own. Returns how many keys were present.
pub fn clear_all_data(store: &mut dyn KvStore) -> PersistResult<usize> {
    let mut removed = 0;
    for key in TRACKED_KEYS {
        if store.get(key)?.is_some() {
            store.remove(key)?;
            removed += 1;
        }
    }
    store.flush()?;
    tracing::info!(removed, "cleared stored data");
    Ok(removed)
}
