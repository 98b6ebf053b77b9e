//! Persisted key-value capability
//!
//! The unmatched-route fallback needs to record a durable flag. The store
//! is injected wherever it is used so the callers stay testable; nothing
//! in this crate reaches for ambient global state.

use std::collections::HashMap;
use std::sync::Mutex;

/// A durable boolean key-value store, scoped to the client instance
pub trait KeyValueStore: Send + Sync {
    fn set(&self, key: &str, value: bool);
    fn get(&self, key: &str) -> Option<bool>;
}

/// In-memory [`KeyValueStore`], for tests and single-process embedding
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, bool>>,
}

impl KeyValueStore for MemoryKv {
    fn set(&self, key: &str, value: bool) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<bool> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }
}
