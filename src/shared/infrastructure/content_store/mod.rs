// Port for a versioned remote content store addressed by path.
//
// Purpose
// - Describe what the project modules need from a git-hosted Contents API without tying them to HTTP.
//
// Responsibilities
// - Read a path together with the revision currently stored there.
// - Write a path, attaching the last observed revision so the store can reject stale writes.
// - Derive the public URL under which a stored path can be fetched.
//
// Boundaries
// - Content crosses this port in its transport encoding (base64). Use `shared::core::blob_encoding`.
//
// Testing guidance
// - `in_memory::InMemoryContentStore` enforces revisions and can be switched offline.

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::core::blob_encoding;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentStoreError {
    #[error("remote rejected the access token: {0}")]
    Auth(String),

    #[error("{path} does not exist on the remote")]
    NotFound { path: String },

    #[error("{path} changed on the remote since it was last read: {message}")]
    Conflict { path: String, message: String },

    #[error("remote unavailable: {0}")]
    Transient(String),

    #[error("remote returned an unreadable response: {0}")]
    Malformed(String),
}

/// Opaque token naming the version of a path currently held by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRevision(pub String);

impl RemoteRevision {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub encoded_content: String,
    pub revision: RemoteRevision,
}

impl RemoteFile {
    pub fn decode(&self) -> Result<Vec<u8>, ContentStoreError> {
        blob_encoding::decode(&self.encoded_content)
            .map_err(|e| ContentStoreError::Malformed(format!("content is not base64: {e}")))
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<RemoteFile, ContentStoreError>;

    /// Create or replace `path`. Implementations first read the path to learn its
    /// current revision; the read and the write are not atomic.
    async fn write(
        &self,
        path: &str,
        encoded_content: &str,
        commit_message: &str,
    ) -> Result<RemoteRevision, ContentStoreError>;

    fn public_url(&self, path: &str) -> String;
}

pub mod github;
pub mod in_memory;
