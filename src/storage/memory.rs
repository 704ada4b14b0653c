use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::KeyValueStore;

/// In-process [`KeyValueStore`]. Contents live as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that behaves like a storage engine that could not be opened:
    /// every read is absent and every write is dropped.
    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        if self.unavailable {
            tracing::error!(key, "storage read failed: store unavailable");
            return None;
        }
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                tracing::error!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) {
        if self.unavailable {
            tracing::error!(key, "storage write failed: store unavailable");
            return;
        }
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value);
            }
            Err(e) => tracing::error!(key, error = %e, "storage write failed"),
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_values() {
        let store = MemoryStore::new();
        store.set("k", json!({"a": [1, 2, 3]}));
        assert_eq!(store.get("k"), Some(json!({"a": [1, 2, 3]})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unavailable_store_drops_writes() {
        let store = MemoryStore::unavailable();
        store.set("k", json!(1));
        assert!(store.get("k").is_none());
        assert!(store.is_empty());
    }
}
