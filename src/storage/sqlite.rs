//! SQLite-backed [`KeyValueStore`].
//!
//! Every call opens its own handle on the named database file and makes sure
//! the `kv_store` table exists, so the store has no long-lived connection to
//! share or poison.

use std::path::{Path, PathBuf};

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::{KeyValueStore, StoreError};
use crate::db;

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<rusqlite::Connection, StoreError> {
        db::open_database(&self.path).map_err(|e| StoreError::Unavailable(format!("{e:#}")))
    }

    fn try_get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.open()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn try_set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let conn = self.open()?;
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, now],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, db = %self.path.display(), error = %e, "storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) {
        match self.try_set(key, &value) {
            Ok(()) => tracing::debug!(key, "stored"),
            Err(e) => {
                tracing::error!(key, db = %self.path.display(), error = %e, "storage write failed")
            }
        }
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
