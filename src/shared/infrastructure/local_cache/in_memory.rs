use std::collections::HashMap;
use std::sync::Mutex;

use crate::shared::infrastructure::local_cache::{LocalCache, LocalCacheError};

#[derive(Default)]
pub struct InMemoryLocalCache {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalCache for InMemoryLocalCache {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, LocalCacheError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), LocalCacheError> {
        self.entries().insert(key.to_string(), value.clone());
        Ok(())
    }
}
