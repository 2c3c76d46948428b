// The project collection and its pure mutations.
//
// Purpose
// - Hold the ordered sequence of projects, most recently created first.
//
// Responsibilities
// - Parse and render the collection document (pretty printed JSON array).
// - Apply add, update and remove without performing any input or output.
// - Reject documents with duplicate ids and amounts below zero.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::modules::projects::core::project::{
    Project, ProjectDraft, ProjectPatch, id_timestamp, is_valid_collected,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectionError {
    #[error("project document is malformed: {0}")]
    Malformed(String),

    #[error("project document lists id {0} more than once")]
    DuplicateId(String),

    #[error("collected amount must be a number of at least 0, got {0}")]
    InvalidCollected(f64),

    #[error("project {0} not found")]
    UnknownProject(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCollection {
    projects: Vec<Project>,
}

impl ProjectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_projects(projects: Vec<Project>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.id.as_str()) {
                return Err(CollectionError::DuplicateId(project.id.clone()));
            }
            if !is_valid_collected(project.collected) {
                return Err(CollectionError::InvalidCollected(project.collected));
            }
        }
        Ok(Self { projects })
    }

    pub fn from_document(bytes: &[u8]) -> Result<Self, CollectionError> {
        let projects: Vec<Project> = serde_json::from_slice(bytes)
            .map_err(|e| CollectionError::Malformed(e.to_string()))?;
        Self::from_projects(projects)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CollectionError> {
        let projects: Vec<Project> = serde_json::from_value(value)
            .map_err(|e| CollectionError::Malformed(e.to_string()))?;
        Self::from_projects(projects)
    }

    pub fn to_document(&self) -> Result<String, CollectionError> {
        serde_json::to_string_pretty(&self.projects)
            .map_err(|e| CollectionError::Malformed(e.to_string()))
    }

    pub fn to_value(&self) -> Result<serde_json::Value, CollectionError> {
        serde_json::to_value(&self.projects).map_err(|e| CollectionError::Malformed(e.to_string()))
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Largest timestamp found in `p_<millis>` ids.
    pub fn newest_id_timestamp(&self) -> Option<i64> {
        self.projects.iter().filter_map(|p| id_timestamp(&p.id)).max()
    }

    pub fn add(
        &mut self,
        id: String,
        draft: ProjectDraft,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&Project, CollectionError> {
        if !is_valid_collected(draft.collected) {
            return Err(CollectionError::InvalidCollected(draft.collected));
        }
        if self.contains(&id) {
            return Err(CollectionError::DuplicateId(id));
        }
        self.projects.insert(
            0,
            Project {
                id,
                title: draft.title,
                target: draft.target,
                description: draft.description,
                collected: draft.collected,
                image,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(&self.projects[0])
    }

    /// Apply `patch` to the project with `id`. A `Some` image replaces the stored one.
    pub fn update(
        &mut self,
        id: &str,
        patch: ProjectPatch,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&Project, CollectionError> {
        if let Some(amount) = patch.collected {
            if !is_valid_collected(amount) {
                return Err(CollectionError::InvalidCollected(amount));
            }
        }
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CollectionError::UnknownProject(id.to_string()))?;

        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(target) = patch.target {
            project.target = target;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(collected) = patch.collected {
            project.collected = collected;
        }
        if image.is_some() {
            project.image = image;
        }
        project.updated_at = now;
        Ok(project)
    }

    pub fn remove(&mut self, id: &str) -> Result<Project, CollectionError> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CollectionError::UnknownProject(id.to_string()))?;
        Ok(self.projects.remove(index))
    }
}
