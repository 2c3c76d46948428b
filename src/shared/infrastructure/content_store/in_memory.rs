// In memory implementation of the ContentStore port.
//
// Purpose
// - Support engine and upload tests, and local development, without a remote repository.
//
// Responsibilities
// - Keep files per path with a content hash as revision.
// - Reproduce the non-atomic read-revision-then-write of the real client, rejecting stale writes.
// - Simulate outages, revoked tokens and one-off write failures.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::shared::core::blob_encoding;
use crate::shared::infrastructure::content_store::{
    ContentStore, ContentStoreError, RemoteFile, RemoteRevision,
};

#[derive(Debug, Clone)]
struct StoredFile {
    encoded_content: String,
    revision: RemoteRevision,
}

pub struct InMemoryContentStore {
    base_url: String,
    files: RwLock<HashMap<String, StoredFile>>,
    commits: Mutex<Vec<String>>,
    offline: AtomicBool,
    token_revoked: AtomicBool,
    next_write_failure: Mutex<Option<ContentStoreError>>,
    write_delay_ms: AtomicU64,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new("memory://content")
    }
}

impl InMemoryContentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            files: RwLock::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            token_revoked: AtomicBool::new(false),
            next_write_failure: Mutex::new(None),
            write_delay_ms: AtomicU64::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn revoke_token(&self) {
        self.token_revoked.store(true, Ordering::SeqCst);
    }

    pub async fn fail_next_write(&self, error: ContentStoreError) {
        *self.next_write_failure.lock().await = Some(error);
    }

    /// Pause between the revision lookup and the write, widening the race window.
    pub fn set_write_delay_ms(&self, ms: u64) {
        self.write_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Place raw bytes at `path` as if another client had committed them.
    pub async fn seed(&self, path: &str, bytes: &[u8]) -> RemoteRevision {
        let revision = revision_of(bytes);
        self.files.write().await.insert(
            path.to_string(),
            StoredFile {
                encoded_content: blob_encoding::encode(bytes),
                revision: revision.clone(),
            },
        );
        revision
    }

    pub async fn content(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.read().await;
        files
            .get(path)
            .and_then(|f| blob_encoding::decode(&f.encoded_content).ok())
    }

    pub async fn commit_messages(&self) -> Vec<String> {
        self.commits.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), ContentStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ContentStoreError::Transient(
                "content store offline".to_string(),
            ));
        }
        if self.token_revoked.load(Ordering::SeqCst) {
            return Err(ContentStoreError::Auth("token revoked".to_string()));
        }
        Ok(())
    }
}

fn revision_of(bytes: &[u8]) -> RemoteRevision {
    RemoteRevision(hex::encode(Sha256::digest(bytes)))
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn read(&self, path: &str) -> Result<RemoteFile, ContentStoreError> {
        self.check_available()?;
        let files = self.files.read().await;
        files
            .get(path)
            .map(|f| RemoteFile {
                encoded_content: f.encoded_content.clone(),
                revision: f.revision.clone(),
            })
            .ok_or_else(|| ContentStoreError::NotFound {
                path: path.to_string(),
            })
    }

    async fn write(
        &self,
        path: &str,
        encoded_content: &str,
        commit_message: &str,
    ) -> Result<RemoteRevision, ContentStoreError> {
        let observed = match self.read(path).await {
            Ok(file) => Some(file.revision),
            Err(ContentStoreError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.check_available()?;
        if let Some(error) = self.next_write_failure.lock().await.take() {
            return Err(error);
        }

        let bytes = blob_encoding::decode(encoded_content)
            .map_err(|e| ContentStoreError::Malformed(e.to_string()))?;
        let mut files = self.files.write().await;
        let current = files.get(path).map(|f| f.revision.clone());
        if current != observed {
            return Err(ContentStoreError::Conflict {
                path: path.to_string(),
                message: "revision does not match".to_string(),
            });
        }

        let revision = revision_of(&bytes);
        files.insert(
            path.to_string(),
            StoredFile {
                encoded_content: encoded_content.to_string(),
                revision: revision.clone(),
            },
        );
        self.commits.lock().await.push(commit_message.to_string());
        Ok(revision)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
