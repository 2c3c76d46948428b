use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::modules::projects::adapters::inbound::http as projects_http;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/projects",
            get(projects_http::list).post(projects_http::add),
        )
        .route("/projects/persist", post(projects_http::persist))
        .route("/projects/reload", post(projects_http::reload))
        .route(
            "/projects/{id}",
            patch(projects_http::update).delete(projects_http::delete),
        )
        .with_state(state)
}
