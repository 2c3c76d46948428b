// Image upload for a project.
//
// Responsibilities
// - Store a pending file under `image/<millis>_<sanitized name>`, unique within the session.
// - Return the public URL to put on the project. Identical content is uploaded again.
//
// Boundaries
// - Failures are returned as is; the sync engine decides how the project degrades.

use std::sync::Arc;

use crate::modules::projects::use_cases::upload_image::path::image_path;
use crate::modules::projects::use_cases::upload_image::pending_file::PendingFile;
use crate::shared::core::blob_encoding;
use crate::shared::core::primitives::MonotonicClock;
use crate::shared::infrastructure::content_store::{ContentStore, ContentStoreError};

pub struct ImageUploadCoordinator {
    store: Arc<dyn ContentStore>,
    clock: Arc<MonotonicClock>,
}

impl ImageUploadCoordinator {
    pub fn new(store: Arc<dyn ContentStore>, clock: Arc<MonotonicClock>) -> Self {
        Self { store, clock }
    }

    pub async fn upload(
        &self,
        file: &PendingFile,
        target_id: &str,
    ) -> Result<String, ContentStoreError> {
        let path = image_path(self.clock.next_millis(), &file.file_name);
        let encoded = blob_encoding::encode(&file.bytes);
        let message = format!("Upload image {path}");
        match self.store.write(&path, &encoded, &message).await {
            Ok(revision) => {
                tracing::info!(project_id = target_id, %path, %revision, "image uploaded");
                Ok(self.store.public_url(&path))
            }
            Err(e) => {
                tracing::warn!(project_id = target_id, %path, error = %e, "image upload failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod image_upload_coordinator_tests {
    use super::*;
    use crate::shared::infrastructure::content_store::in_memory::InMemoryContentStore;
    use rstest::{fixture, rstest};

    type BeforeEachReturn = (Arc<InMemoryContentStore>, ImageUploadCoordinator);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let store = Arc::new(InMemoryContentStore::new("https://raw.example.test/acme/site/main"));
        let coordinator = ImageUploadCoordinator::new(store.clone(), Arc::new(MonotonicClock::new()));
        (store, coordinator)
    }

    fn uploaded_path(url: &str) -> &str {
        url.strip_prefix("https://raw.example.test/acme/site/main/").unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_store_the_bytes_under_a_sanitized_path(before_each: BeforeEachReturn) {
        let (store, coordinator) = before_each;
        let file = PendingFile::new("my photo!.png", vec![0u8, 1, 2, 255]);

        let url = coordinator.upload(&file, "p_1").await.unwrap();

        let path = uploaded_path(&url);
        let name = path.strip_prefix("image/").unwrap();
        let (millis, rest) = name.split_once('_').unwrap();
        assert!(!millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "my_photo_.png");
        assert_eq!(store.content(path).await.unwrap(), vec![0u8, 1, 2, 255]);
        assert_eq!(
            store.commit_messages().await,
            vec![format!("Upload image {path}")]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_collide_when_the_same_file_is_uploaded_twice(
        before_each: BeforeEachReturn,
    ) {
        let (store, coordinator) = before_each;
        let file = PendingFile::new("a.png", b"same".to_vec());

        let first = coordinator.upload(&file, "p_1").await.unwrap();
        let second = coordinator.upload(&file, "p_1").await.unwrap();

        assert_ne!(first, second);
        assert!(store.content(uploaded_path(&first)).await.is_some());
        assert!(store.content(uploaded_path(&second)).await.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pass_remote_failures_through(before_each: BeforeEachReturn) {
        let (store, coordinator) = before_each;
        store.revoke_token();
        let result = coordinator.upload(&PendingFile::new("a.png", vec![1]), "p_1").await;
        assert!(matches!(result, Err(ContentStoreError::Auth(_))));
    }
}
