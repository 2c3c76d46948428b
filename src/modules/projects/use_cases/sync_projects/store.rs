// Persistence targets for the project collection.
//
// Purpose
// - One port, two implementations, chosen once per session: the remote repository
//   (mirrored into the local cache) when credentials are complete, the local cache otherwise.
//
// Responsibilities
// - Load: remote document first; on NotFound fall back to the cache silently, on other
//   remote failures fall back and report. A malformed document yields an empty collection
//   and a validation error instead of partial data.
// - Save: serialize the whole collection and write it; remote saves are mirrored to the cache.
// - Never replace a remote document the session has not seen: a document rejected at load
//   blocks saves until it is reloaded, and after a fallback load the remote is re-read
//   and must still match what the session was seeded with.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::projects::core::collection::ProjectCollection;
use crate::modules::projects::use_cases::sync_projects::errors::SyncError;
use crate::modules::projects::use_cases::sync_projects::outcome::PersistStatus;
use crate::shared::core::blob_encoding;
use crate::shared::infrastructure::content_store::{ContentStore, ContentStoreError};
use crate::shared::infrastructure::local_cache::LocalCache;

pub const DOCUMENT_PATH: &str = "data/projects.json";
pub const CACHE_KEY: &str = "projects";
const COMMIT_MESSAGE: &str = "Update projects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Cache,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCollection {
    pub collection: ProjectCollection,
    pub source: LoadSource,
    /// Problem met while loading that the caller should be told about.
    pub warning: Option<SyncError>,
    /// The collection is not yet held by the store it was loaded for.
    pub needs_push: bool,
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn load(&self) -> LoadedCollection;
    async fn save(&self, collection: &ProjectCollection) -> Result<PersistStatus, SyncError>;
    fn name(&self) -> &'static str;
}

fn load_from_cache(cache: &dyn LocalCache) -> LoadedCollection {
    let parsed = match cache.read(CACHE_KEY) {
        Ok(Some(value)) => ProjectCollection::from_value(value)
            .map(Some)
            .map_err(SyncError::from),
        Ok(None) => Ok(None),
        Err(e) => Err(SyncError::from(e)),
    };
    match parsed {
        Ok(Some(collection)) => LoadedCollection {
            collection,
            source: LoadSource::Cache,
            warning: None,
            needs_push: false,
        },
        Ok(None) => LoadedCollection {
            collection: ProjectCollection::new(),
            source: LoadSource::Empty,
            warning: None,
            needs_push: false,
        },
        Err(e) => {
            tracing::warn!(error = %e, "cached projects unreadable, starting empty");
            LoadedCollection {
                collection: ProjectCollection::new(),
                source: LoadSource::Empty,
                warning: Some(e),
                needs_push: false,
            }
        }
    }
}

pub struct LocalCollectionStore {
    cache: Arc<dyn LocalCache>,
}

impl LocalCollectionStore {
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CollectionStore for LocalCollectionStore {
    async fn load(&self) -> LoadedCollection {
        load_from_cache(self.cache.as_ref())
    }

    async fn save(&self, collection: &ProjectCollection) -> Result<PersistStatus, SyncError> {
        self.cache.write(CACHE_KEY, &collection.to_value()?)?;
        tracing::info!(projects = collection.len(), "projects saved to local cache");
        Ok(PersistStatus::SavedLocally)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// What the last load learned about the remote document.
#[derive(Debug, Clone, PartialEq)]
enum RemoteBaseline {
    /// Read and accepted, or not there yet.
    Synced,
    /// Present but invalid; replacing it would drop whatever it still holds.
    Rejected(String),
    /// Unreadable at load, so the session was seeded from this fallback collection.
    Unverified(ProjectCollection),
}

pub struct RemoteCollectionStore {
    content: Arc<dyn ContentStore>,
    cache: Arc<dyn LocalCache>,
    baseline: RwLock<RemoteBaseline>,
}

impl RemoteCollectionStore {
    pub fn new(content: Arc<dyn ContentStore>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            content,
            cache,
            baseline: RwLock::new(RemoteBaseline::Synced),
        }
    }

    async fn set_baseline(&self, baseline: RemoteBaseline) {
        *self.baseline.write().await = baseline;
    }

    async fn check_baseline(&self) -> Result<(), SyncError> {
        let baseline = self.baseline.read().await.clone();
        match baseline {
            RemoteBaseline::Synced => Ok(()),
            RemoteBaseline::Rejected(reason) => Err(SyncError::Validation(format!(
                "the stored project document was rejected on load ({reason}); repair it and reload before saving"
            ))),
            RemoteBaseline::Unverified(seed) => match self.content.read(DOCUMENT_PATH).await {
                Ok(file) => {
                    let remote = file
                        .decode()
                        .ok()
                        .and_then(|bytes| ProjectCollection::from_document(&bytes).ok());
                    if remote.as_ref() == Some(&seed) {
                        Ok(())
                    } else {
                        tracing::warn!("remote projects differ from the fallback this session loaded");
                        Err(SyncError::Remote(ContentStoreError::Conflict {
                            path: DOCUMENT_PATH.to_string(),
                            message: "the remote could not be read when this session loaded".to_string(),
                        }))
                    }
                }
                Err(ContentStoreError::NotFound { .. }) => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn mirror(&self, collection: &ProjectCollection) {
        let result = collection
            .to_value()
            .map_err(SyncError::from)
            .and_then(|value| self.cache.write(CACHE_KEY, &value).map_err(SyncError::from));
        if let Err(e) = result {
            tracing::warn!(error = %e, "could not mirror projects into the local cache");
        }
    }
}

#[async_trait]
impl CollectionStore for RemoteCollectionStore {
    async fn load(&self) -> LoadedCollection {
        match self.content.read(DOCUMENT_PATH).await {
            Ok(file) => {
                let parsed = file
                    .decode()
                    .map_err(SyncError::from)
                    .and_then(|bytes| ProjectCollection::from_document(&bytes).map_err(SyncError::from));
                match parsed {
                    Ok(collection) => {
                        tracing::info!(
                            revision = %file.revision,
                            projects = collection.len(),
                            "projects loaded from remote"
                        );
                        self.mirror(&collection);
                        self.set_baseline(RemoteBaseline::Synced).await;
                        LoadedCollection {
                            collection,
                            source: LoadSource::Remote,
                            warning: None,
                            needs_push: false,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "remote project document is invalid, starting empty");
                        self.set_baseline(RemoteBaseline::Rejected(e.to_string())).await;
                        LoadedCollection {
                            collection: ProjectCollection::new(),
                            source: LoadSource::Empty,
                            warning: Some(e),
                            needs_push: false,
                        }
                    }
                }
            }
            Err(ContentStoreError::NotFound { .. }) => {
                tracing::info!("no remote project document yet, using local cache");
                self.set_baseline(RemoteBaseline::Synced).await;
                let mut loaded = load_from_cache(self.cache.as_ref());
                loaded.needs_push = !loaded.collection.is_empty();
                loaded
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote load failed, using local cache");
                let mut loaded = load_from_cache(self.cache.as_ref());
                self.set_baseline(RemoteBaseline::Unverified(loaded.collection.clone()))
                    .await;
                loaded.warning = Some(SyncError::from(e));
                loaded
            }
        }
    }

    async fn save(&self, collection: &ProjectCollection) -> Result<PersistStatus, SyncError> {
        self.check_baseline().await?;
        let document = collection.to_document()?;
        let encoded = blob_encoding::encode(document.as_bytes());
        let revision = self
            .content
            .write(DOCUMENT_PATH, &encoded, COMMIT_MESSAGE)
            .await?;
        tracing::info!(%revision, projects = collection.len(), "projects saved to remote");
        self.set_baseline(RemoteBaseline::Synced).await;
        self.mirror(collection);
        Ok(PersistStatus::SavedRemote { revision })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
