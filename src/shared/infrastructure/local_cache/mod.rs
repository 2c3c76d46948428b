// Port for the on-device key-value cache.
//
// Purpose
// - Keep the last known project collection when no remote credentials are available,
//   and mirror the remote so a later session without credentials still sees it.
//
// Responsibilities
// - `read` returns the stored JSON value or None. `write` overwrites.
// - Calls are synchronous; the values are small documents.
//
// Boundaries
// - Errors here are disk or encoding problems, not ordinary outcomes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalCacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid cache key {0:?}")]
    InvalidKey(String),
}

pub trait LocalCache: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, LocalCacheError>;
    fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), LocalCacheError>;
}

pub mod file;
pub mod in_memory;
