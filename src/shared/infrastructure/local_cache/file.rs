// File backed implementation of the LocalCache port.
//
// Responsibilities
// - Store each key as `<dir>/<key>.json`, pretty printed.
// - Replace entries through a temporary file and rename, so a crash never leaves half a document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::shared::infrastructure::local_cache::{LocalCache, LocalCacheError};

#[derive(Debug, Clone)]
pub struct FileLocalCache {
    dir: PathBuf,
}

impl FileLocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, LocalCacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LocalCacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for FileLocalCache {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, LocalCacheError> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), LocalCacheError> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.dir)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&staging, &path)?;
        tracing::debug!(key, path = %path.display(), "local cache entry written");
        Ok(())
    }
}
