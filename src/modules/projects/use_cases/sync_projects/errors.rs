use thiserror::Error;

use crate::modules::projects::core::collection::CollectionError;
use crate::shared::infrastructure::content_store::ContentStoreError;
use crate::shared::infrastructure::local_cache::LocalCacheError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] ContentStoreError),

    #[error("local cache failed: {0}")]
    LocalCache(String),

    #[error("invalid project data: {0}")]
    Validation(String),

    #[error("project {0} not found")]
    UnknownProject(String),

    #[error("remote storage is not configured")]
    RemoteNotConfigured,
}

impl SyncError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Remote(ContentStoreError::Conflict { .. }))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Remote(ContentStoreError::Auth(_)))
    }
}

impl From<LocalCacheError> for SyncError {
    fn from(e: LocalCacheError) -> Self {
        SyncError::LocalCache(e.to_string())
    }
}

impl From<CollectionError> for SyncError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::UnknownProject(id) => SyncError::UnknownProject(id),
            other => SyncError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod sync_error_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_single_out_conflicts() {
        let conflict = SyncError::from(ContentStoreError::Conflict {
            path: "data/projects.json".into(),
            message: "does not match".into(),
        });
        assert!(conflict.is_conflict());
        assert!(!SyncError::from(ContentStoreError::Transient("down".into())).is_conflict());
    }

    #[rstest]
    fn it_should_map_collection_errors() {
        assert_eq!(
            SyncError::from(CollectionError::UnknownProject("p_1".into())),
            SyncError::UnknownProject("p_1".into())
        );
        assert!(matches!(
            SyncError::from(CollectionError::InvalidCollected(-1.0)),
            SyncError::Validation(_)
        ));
    }

    #[rstest]
    fn it_should_keep_the_remote_message_readable() {
        let err = SyncError::from(ContentStoreError::Auth("401 Unauthorized: Bad credentials".into()));
        assert!(err.is_auth());
        assert_eq!(
            err.to_string(),
            "remote rejected the access token: 401 Unauthorized: Bad credentials"
        );
    }
}
