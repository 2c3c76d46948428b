// Project data types.
//
// Purpose
// - The fundraising project as stored in the collection document, plus the shapes a caller
//   uses to create or edit one.
//
// Responsibilities
// - Serialize with the camelCase field names of the stored document.
// - Own the `p_<millis>` id format. Ids are never edited after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "p_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub target: String,
    pub description: String,
    pub collected: f64,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a new project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub target: String,
    pub description: String,
    #[serde(default)]
    pub collected: f64,
}

/// Fields to replace on an existing project; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub target: Option<String>,
    pub description: Option<String>,
    pub collected: Option<f64>,
}

impl ProjectPatch {
    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.title = Some(v.into());
        self
    }

    pub fn target(mut self, v: impl Into<String>) -> Self {
        self.target = Some(v.into());
        self
    }

    pub fn description(mut self, v: impl Into<String>) -> Self {
        self.description = Some(v.into());
        self
    }

    pub fn collected(mut self, v: f64) -> Self {
        self.collected = Some(v);
        self
    }
}

pub fn project_id(millis: i64) -> String {
    format!("{ID_PREFIX}{millis}")
}

/// Timestamp embedded in a `p_<millis>` id, if the id has that shape.
pub fn id_timestamp(id: &str) -> Option<i64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

pub fn is_valid_collected(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
