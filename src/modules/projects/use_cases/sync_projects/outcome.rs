use crate::modules::projects::core::project::Project;
use crate::modules::projects::use_cases::sync_projects::errors::SyncError;
use crate::shared::infrastructure::content_store::RemoteRevision;

/// Where the engine is in its load/persist cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Loaded,
    /// In-memory collection holds changes that no store has accepted yet.
    Dirty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistStatus {
    SavedRemote { revision: RemoteRevision },
    SavedLocally,
    Failed(SyncError),
    NotConfirmed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub project: Option<Project>,
    pub projects: Vec<Project>,
    pub persist: PersistStatus,
    pub image_error: Option<SyncError>,
}

impl MutationOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(
            self.persist,
            PersistStatus::SavedRemote { .. } | PersistStatus::SavedLocally
        )
    }

    pub fn status_message(&self) -> String {
        let mut message = match &self.persist {
            PersistStatus::SavedRemote { .. } => "Saved to the repository.".to_string(),
            PersistStatus::SavedLocally => {
                "Saved locally; repository credentials are not configured.".to_string()
            }
            PersistStatus::Failed(e) if e.is_conflict() => format!(
                "Save failed: {e}. Reload the projects and try again."
            ),
            PersistStatus::Failed(e) => format!("Save failed: {e}. Changes are kept in this session."),
            PersistStatus::NotConfirmed => "Deletion not confirmed; nothing changed.".to_string(),
            PersistStatus::Unchanged => "Nothing to save.".to_string(),
        };
        if let Some(e) = &self.image_error {
            message.push_str(&format!(" Image upload failed: {e}."));
        }
        message
    }
}
