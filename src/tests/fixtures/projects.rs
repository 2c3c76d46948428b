// Shared test fixtures for project drafts and timestamps.
// Compiled only for unit tests, reachable as `crate::tests::fixtures::projects`.

use chrono::{DateTime, Utc};

use crate::modules::projects::core::project::ProjectDraft;

const PROJECT_DRAFT_JSON: &str = include_str!("json/project_draft.json");

pub fn at_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

pub struct ProjectDraftBuilder {
    inner: ProjectDraft,
}

impl Default for ProjectDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ProjectDraftBuilder {
    pub fn new() -> Self {
        Self {
            inner: serde_json::from_str(PROJECT_DRAFT_JSON).unwrap(),
        }
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.inner.title = v.into();
        self
    }

    pub fn target(mut self, v: impl Into<String>) -> Self {
        self.inner.target = v.into();
        self
    }

    pub fn description(mut self, v: impl Into<String>) -> Self {
        self.inner.description = v.into();
        self
    }

    pub fn collected(mut self, v: f64) -> Self {
        self.inner.collected = v;
        self
    }

    pub fn build(self) -> ProjectDraft {
        self.inner
    }
}

#[cfg(test)]
mod project_draft_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_delegates_to_new_and_parses_json() {
        let built = ProjectDraftBuilder::default().build();
        assert_eq!(built.title, "A");
        assert_eq!(built.target, "100");
        assert_eq!(built.description, "d");
        assert_eq!(built.collected, 0.0);
    }

    #[rstest]
    fn setters_override_all_fields() {
        let built = ProjectDraftBuilder::new()
            .title("Roof")
            .target("5000")
            .description("New roof")
            .collected(12.0)
            .build();
        assert_eq!(built.title, "Roof");
        assert_eq!(built.target, "5000");
        assert_eq!(built.description, "New roof");
        assert_eq!(built.collected, 12.0);
    }
}
