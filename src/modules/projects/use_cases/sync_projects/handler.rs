// Document sync engine for the project collection.
//
// Responsibilities
// - Load the collection once per session, lazily, from the store chosen for the session.
// - Apply add, update and delete to the in-memory collection, then persist the whole collection.
// - Fold uploaded image URLs into the project before it is serialized.
// - Keep in-memory changes when a save fails, and report every outcome as a status.
//
// Concurrency
// - Mutations and `persist` queue on a single writer lock so only one save is in flight;
//   readers only take the collection lock and see a mutation before its save completes.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::modules::projects::core::collection::ProjectCollection;
use crate::modules::projects::core::project::{
    Project, ProjectDraft, ProjectPatch, is_valid_collected, project_id,
};
use crate::modules::projects::use_cases::sync_projects::errors::SyncError;
use crate::modules::projects::use_cases::sync_projects::outcome::{
    MutationOutcome, PersistStatus, SyncState,
};
use crate::modules::projects::use_cases::sync_projects::store::{
    CollectionStore, LocalCollectionStore, RemoteCollectionStore,
};
use crate::modules::projects::use_cases::upload_image::handler::ImageUploadCoordinator;
use crate::modules::projects::use_cases::upload_image::pending_file::PendingFile;
use crate::shared::core::primitives::MonotonicClock;
use crate::shared::infrastructure::content_store::ContentStore;
use crate::shared::infrastructure::local_cache::LocalCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    NotConfirmed,
}

impl From<bool> for DeleteConfirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            DeleteConfirmation::Confirmed
        } else {
            DeleteConfirmation::NotConfirmed
        }
    }
}

struct Session {
    state: SyncState,
    collection: ProjectCollection,
    load_warning: Option<SyncError>,
}

pub struct DocumentSyncEngine {
    store: Arc<dyn CollectionStore>,
    uploader: Option<ImageUploadCoordinator>,
    clock: Arc<MonotonicClock>,
    session: RwLock<Session>,
    loaded: OnceCell<()>,
    writer: Mutex<()>,
}

impl DocumentSyncEngine {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        uploader: Option<ImageUploadCoordinator>,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self {
            store,
            uploader,
            clock,
            session: RwLock::new(Session {
                state: SyncState::Uninitialized,
                collection: ProjectCollection::new(),
                load_warning: None,
            }),
            loaded: OnceCell::new(),
            writer: Mutex::new(()),
        }
    }

    /// Session backed by the remote repository, mirrored into `cache`.
    pub fn remote(content: Arc<dyn ContentStore>, cache: Arc<dyn LocalCache>) -> Self {
        let clock = Arc::new(MonotonicClock::new());
        let uploader = ImageUploadCoordinator::new(content.clone(), clock.clone());
        let store = Arc::new(RemoteCollectionStore::new(content, cache));
        Self::new(store, Some(uploader), clock)
    }

    /// Session without remote credentials: everything stays in `cache`, images cannot be stored.
    pub fn local(cache: Arc<dyn LocalCache>) -> Self {
        let store = Arc::new(LocalCollectionStore::new(cache));
        Self::new(store, None, Arc::new(MonotonicClock::new()))
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub async fn state(&self) -> SyncState {
        self.session.read().await.state
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.ensure_loaded().await;
        self.snapshot().await
    }

    /// Problem reported while loading the collection, if any.
    pub async fn load_status(&self) -> Option<SyncError> {
        self.ensure_loaded().await;
        self.session.read().await.load_warning.clone()
    }

    pub async fn add(
        &self,
        draft: ProjectDraft,
        image: Option<PendingFile>,
    ) -> Result<MutationOutcome, SyncError> {
        self.ensure_loaded().await;
        let _writer = self.writer.lock().await;
        if !is_valid_collected(draft.collected) {
            return Err(SyncError::Validation(format!(
                "collected amount must be a number of at least 0, got {}",
                draft.collected
            )));
        }

        let (id, created_at) = self.next_id().await;
        let (image_url, image_error) = self.upload(image.as_ref(), &id).await;
        let project = {
            let mut session = self.session.write().await;
            let project = session
                .collection
                .add(id, draft, image_url, created_at)?
                .clone();
            session.state = SyncState::Dirty;
            project
        };
        tracing::info!(project_id = %project.id, "project added");

        let persist = self.persist_locked().await;
        Ok(self.outcome(Some(project), persist, image_error).await)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: ProjectPatch,
        image: Option<PendingFile>,
    ) -> Result<MutationOutcome, SyncError> {
        self.ensure_loaded().await;
        let _writer = self.writer.lock().await;
        if !self.session.read().await.collection.contains(id) {
            return Err(SyncError::UnknownProject(id.to_string()));
        }
        if let Some(amount) = patch.collected {
            if !is_valid_collected(amount) {
                return Err(SyncError::Validation(format!(
                    "collected amount must be a number of at least 0, got {amount}"
                )));
            }
        }

        let (image_url, image_error) = self.upload(image.as_ref(), id).await;
        let now = self.now();
        let project = {
            let mut session = self.session.write().await;
            let project = session
                .collection
                .update(id, patch, image_url, now)?
                .clone();
            session.state = SyncState::Dirty;
            project
        };
        tracing::info!(project_id = %project.id, "project updated");

        let persist = self.persist_locked().await;
        Ok(self.outcome(Some(project), persist, image_error).await)
    }

    pub async fn delete(
        &self,
        id: &str,
        confirmation: impl Into<DeleteConfirmation>,
    ) -> Result<MutationOutcome, SyncError> {
        self.ensure_loaded().await;
        if confirmation.into() == DeleteConfirmation::NotConfirmed {
            tracing::debug!(project_id = id, "deletion not confirmed");
            return Ok(self.outcome(None, PersistStatus::NotConfirmed, None).await);
        }

        let _writer = self.writer.lock().await;
        let removed = {
            let mut session = self.session.write().await;
            let removed = session.collection.remove(id)?;
            session.state = SyncState::Dirty;
            removed
        };
        tracing::info!(project_id = %removed.id, "project deleted");

        let persist = self.persist_locked().await;
        Ok(self.outcome(Some(removed), persist, None).await)
    }

    /// Save the collection if it holds unsaved changes. Used to retry after a failed save.
    pub async fn persist(&self) -> MutationOutcome {
        self.ensure_loaded().await;
        let _writer = self.writer.lock().await;
        let persist = if self.state().await == SyncState::Dirty {
            self.persist_locked().await
        } else {
            PersistStatus::Unchanged
        };
        self.outcome(None, persist, None).await
    }

    /// Drop the session's collection, unsaved changes included, and load it again from the store.
    pub async fn reload(&self) -> Vec<Project> {
        self.ensure_loaded().await;
        let _writer = self.writer.lock().await;
        self.load_into_session().await;
        self.snapshot().await
    }

    async fn ensure_loaded(&self) {
        self.loaded
            .get_or_init(|| self.load_into_session())
            .await;
    }

    async fn load_into_session(&self) {
        let loaded = self.store.load().await;
        if let Some(newest) = loaded.collection.newest_id_timestamp() {
            self.clock.advance_past(newest);
        }
        tracing::info!(
            backend = self.store.name(),
            source = ?loaded.source,
            projects = loaded.collection.len(),
            "project collection loaded"
        );
        let mut session = self.session.write().await;
        session.collection = loaded.collection;
        session.load_warning = loaded.warning;
        session.state = if loaded.needs_push {
            SyncState::Dirty
        } else {
            SyncState::Loaded
        };
    }

    /// Must be called with the writer lock held.
    async fn persist_locked(&self) -> PersistStatus {
        let snapshot = self.session.read().await.collection.clone();
        match self.store.save(&snapshot).await {
            Ok(status) => {
                self.session.write().await.state = SyncState::Loaded;
                status
            }
            Err(e) => {
                tracing::warn!(backend = self.store.name(), error = %e, "saving projects failed, changes kept in memory");
                PersistStatus::Failed(e)
            }
        }
    }

    async fn upload(
        &self,
        image: Option<&PendingFile>,
        target_id: &str,
    ) -> (Option<String>, Option<SyncError>) {
        let Some(file) = image else {
            return (None, None);
        };
        let Some(uploader) = &self.uploader else {
            tracing::warn!(project_id = target_id, "image dropped, remote storage not configured");
            return (None, Some(SyncError::RemoteNotConfigured));
        };
        match uploader.upload(file, target_id).await {
            Ok(url) => (Some(url), None),
            Err(e) => (None, Some(SyncError::from(e))),
        }
    }

    async fn next_id(&self) -> (String, DateTime<Utc>) {
        let session = self.session.read().await;
        loop {
            let millis = self.clock.next_millis();
            let id = project_id(millis);
            if !session.collection.contains(&id) {
                return (id, to_datetime(millis));
            }
        }
    }

    fn now(&self) -> DateTime<Utc> {
        to_datetime(self.clock.next_millis())
    }

    async fn snapshot(&self) -> Vec<Project> {
        self.session.read().await.collection.projects().to_vec()
    }

    async fn outcome(
        &self,
        project: Option<Project>,
        persist: PersistStatus,
        image_error: Option<SyncError>,
    ) -> MutationOutcome {
        MutationOutcome {
            project,
            projects: self.snapshot().await,
            persist,
            image_error,
        }
    }
}

fn to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}
