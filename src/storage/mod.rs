//! Key-value persistence port.
//!
//! [`KeyValueStore`] is the only surface the journal uses to reach durable
//! storage. Implementations never fail the caller: a failed read looks like a
//! key that was never written and a failed write is dropped, both after being
//! logged. [`SqliteStore`] is the on-disk backend and [`MemoryStore`] backs
//! tests. [`Persister`] layers a write-through or write-behind policy on top.

pub mod memory;
pub mod persister;
pub mod sqlite;

pub use memory::MemoryStore;
pub use persister::{PersistencePolicy, Persister};
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Key holding the thought list (JSON array of thoughts).
pub const THOUGHTS_KEY: &str = "thoughts";
/// Key holding the registered usernames (JSON array of strings).
pub const REGISTERED_USERS_KEY: &str = "registered_users";
/// Key holding the theme (`"light"` or `"dark"`).
pub const THEME_KEY: &str = "theme";
/// Key holding the current session's username.
pub const USER_KEY: &str = "user";

/// Errors raised inside a backend. They stop at the [`KeyValueStore`] boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from string keys to JSON values.
///
/// Methods are synchronous; async callers go through [`Persister`] or
/// `tokio::task::spawn_blocking`.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. `None` if the key was never written or the read failed.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a key. A failed write is logged and otherwise ignored.
    fn set(&self, key: &str, value: Value);

    /// Short backend label for diagnostics.
    fn backend(&self) -> &'static str;
}

/// Read and decode a typed value. A value that does not decode as `T` is
/// logged and treated as absent.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    decode(key, store.get(key)?)
}

/// Decode a stored value, logging and discarding one with the wrong shape.
pub fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::error!(key, error = %e, "stored value has unexpected shape, ignoring");
            None
        }
    }
}

/// Encode a value for storage. Encoding failures are logged.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode value for storage");
            None
        }
    }
}
