use std::sync::Arc;

use crate::modules::projects::use_cases::sync_projects::handler::DocumentSyncEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DocumentSyncEngine>,
}
