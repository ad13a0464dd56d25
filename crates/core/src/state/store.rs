//! # Persistent Key-Value Store
//!
//! Generic JSON get/set/remove over a durable backend. Each top-level
//! piece of state is written under its own key; there are no
//! transactional guarantees across keys.

use super::db::LabDb;
use crate::error::{LabError, LabResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed store keys
pub mod keys {
    pub const API_KEY: &str = "promptlab.api-key";
    pub const CURRENT_PROMPT: &str = "promptlab.current-prompt";
    pub const MESSAGES: &str = "promptlab.messages";
    pub const PROMPT_VERSIONS: &str = "promptlab.prompt-versions";
    pub const KNOWLEDGE_BASE: &str = "promptlab.knowledge-base";
}

/// Raw string backend
pub trait KeyValueBackend: Send + Sync {
    fn read(&self, key: &str) -> LabResult<Option<String>>;

    /// Fails with `StorageDegraded` when the value does not fit
    fn write(&self, key: &str, value: &str) -> LabResult<()>;

    fn delete(&self, key: &str) -> LabResult<()>;
}

fn check_quota(quota_bytes: Option<usize>, key: &str, value: &str) -> LabResult<()> {
    match quota_bytes {
        Some(limit) if value.len() > limit => Err(LabError::StorageDegraded(format!(
            "value for '{}' is {} bytes, quota is {} bytes",
            key,
            value.len(),
            limit
        ))),
        _ => Ok(()),
    }
}

/// SQLite-backed store sharing the `LabDb` connection
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    quota_bytes: Option<usize>,
}

impl SqliteBackend {
    pub fn new(db: &LabDb) -> Self {
        Self {
            conn: db.connection(),
            quota_bytes: None,
        }
    }

    /// Limit the size of a single value (emulates a browser storage quota)
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    fn lock(&self) -> LabResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LabError::Storage(format!("Lock error: {}", e)))
    }
}

impl KeyValueBackend for SqliteBackend {
    fn read(&self, key: &str) -> LabResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> LabResult<()> {
        check_quota(self.quota_bytes, key, value)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = ?2,
                updated_at = ?3
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> LabResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Volatile backend
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    fn lock(&self) -> LabResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| LabError::Storage(format!("Lock error: {}", e)))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> LabResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> LabResult<()> {
        check_quota(self.quota_bytes, key, value)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> LabResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Typed JSON view over a backend. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store over the shared SQLite database
    pub fn sqlite(db: &LabDb, quota_bytes: Option<usize>) -> Self {
        let backend = match quota_bytes {
            Some(limit) => SqliteBackend::new(db).with_quota(limit),
            None => SqliteBackend::new(db),
        };
        Self::new(Arc::new(backend))
    }

    /// Store that forgets everything on drop
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Deserialize the value under `key`, or `fallback` when it is missing
    /// or unreadable. Parse failures are logged, never surfaced.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read from store");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unparseable stored value");
                fallback
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> LabResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(key, &raw)
    }

    pub fn remove(&self, key: &str) -> LabResult<()> {
        self.backend.delete(key)
    }
}
