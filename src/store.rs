// 🗄️ Persistent Store - durable key/value text storage
//
// The ledger only ever needs get/set/remove by string key.
// SqliteStore keeps every key in one WAL-mode table so both commodities
// can share a single database file with separate key namespaces.

use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable key/value text store
pub trait PersistentStore {
    /// Read the value stored under `key` (None = absent)
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key` (absent keys are not an error)
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed store (one `kv_store` table, WAL journal)
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Throwaway database, mostly for tests
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        setup_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All keys currently stored, sorted
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl PersistentStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();

        assert_eq!(store.get("milkData").unwrap(), None);

        store.set("milkData", "{}").unwrap();
        assert_eq!(store.get("milkData").unwrap().as_deref(), Some("{}"));

        store.set("milkData", "{\"2024-07-01\":2.0}").unwrap();
        assert_eq!(
            store.get("milkData").unwrap().as_deref(),
            Some("{\"2024-07-01\":2.0}"),
            "set should replace the previous value"
        );

        store.remove("milkData").unwrap();
        assert!(store.is_empty());

        // Removing twice is fine
        store.remove("milkData").unwrap();
    }

    #[test]
    fn test_sqlite_store_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.set("costPerDay", "{}").unwrap();
        store.set("costPerDay", "{\"2024-07-01\":150.0}").unwrap();

        assert_eq!(
            store.get("costPerDay").unwrap().as_deref(),
            Some("{\"2024-07-01\":150.0}")
        );
        assert_eq!(store.keys().unwrap(), vec!["costPerDay".to_string()]);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("milktrack.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("lastEnteredCost", "45").unwrap();
            store.set("waterData", "{}").unwrap();
            store.remove("waterData").unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("lastEnteredCost").unwrap().as_deref(), Some("45"));
        assert_eq!(reopened.get("waterData").unwrap(), None);
    }

    #[test]
    fn test_shared_store_through_arc() {
        let store = Arc::new(MemoryStore::new());
        let milk_handle = Arc::clone(&store);
        let water_handle = Arc::clone(&store);

        milk_handle.set("milkData", "{}").unwrap();
        water_handle.set("waterData", "{}").unwrap();

        assert_eq!(store.len(), 2);
    }
}
