// HTTP inbound adapter for the project collection.
//
// Purpose
// - Let a browser page drive the sync engine with JSON requests and show the status it returns.
//
// Responsibilities
// - Translate request bodies into drafts, patches and pending files.
// - Return the resulting collection with a human readable status. A failed save is still a
//   successful request: the change is kept in the session and `saved` is false.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::modules::projects::core::project::{Project, ProjectDraft, ProjectPatch};
use crate::modules::projects::use_cases::sync_projects::errors::SyncError;
use crate::modules::projects::use_cases::sync_projects::outcome::MutationOutcome;
use crate::modules::projects::use_cases::upload_image::pending_file::PendingFile;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct ImageBody {
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Deserialize)]
pub struct AddProjectBody {
    #[serde(flatten)]
    pub draft: ProjectDraft,
    pub image: Option<ImageBody>,
}

#[derive(Deserialize)]
pub struct UpdateProjectBody {
    #[serde(flatten)]
    pub patch: ProjectPatch,
    pub image: Option<ImageBody>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub confirm: Option<bool>,
}

#[derive(Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct MutationResponse {
    pub project: Option<Project>,
    pub projects: Vec<Project>,
    pub saved: bool,
    pub status: String,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        Self {
            saved: outcome.is_saved(),
            status: outcome.status_message(),
            project: outcome.project,
            projects: outcome.projects,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: String,
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ErrorBody {
            status: message.into(),
        }),
    )
        .into_response()
}

fn sync_error_response(error: SyncError) -> Response {
    let code = match &error {
        SyncError::Validation(_) => StatusCode::BAD_REQUEST,
        SyncError::UnknownProject(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(code, error.to_string())
}

fn pending_file(image: Option<ImageBody>) -> Result<Option<PendingFile>, Response> {
    image
        .map(|i| PendingFile::from_base64(i.file_name, &i.content_base64))
        .transpose()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("image is not base64: {e}")))
}

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let projects = state.engine.projects().await;
    let status = state.engine.load_status().await.map(|e| e.to_string());
    Json(ListProjectsResponse { projects, status })
}

pub async fn add(
    State(state): State<AppState>,
    body: Result<Json<AddProjectBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let image = match pending_file(body.image) {
        Ok(image) => image,
        Err(response) => return response,
    };
    match state.engine.add(body.draft, image).await {
        Ok(outcome) => (StatusCode::CREATED, Json(MutationResponse::from(outcome))).into_response(),
        Err(e) => sync_error_response(e),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProjectBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    let image = match pending_file(body.image) {
        Ok(image) => image,
        Err(response) => return response,
    };
    match state.engine.update(&id, body.patch, image).await {
        Ok(outcome) => Json(MutationResponse::from(outcome)).into_response(),
        Err(e) => sync_error_response(e),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Response {
    match state
        .engine
        .delete(&id, params.confirm.unwrap_or(false))
        .await
    {
        Ok(outcome) => Json(MutationResponse::from(outcome)).into_response(),
        Err(e) => sync_error_response(e),
    }
}

pub async fn reload(State(state): State<AppState>) -> impl IntoResponse {
    let projects = state.engine.reload().await;
    let status = state.engine.load_status().await.map(|e| e.to_string());
    Json(ListProjectsResponse { projects, status })
}

pub async fn persist(State(state): State<AppState>) -> impl IntoResponse {
    Json(MutationResponse::from(state.engine.persist().await))
}

#[cfg(test)]
mod projects_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::modules::projects::use_cases::sync_projects::handler::DocumentSyncEngine;
    use crate::modules::projects::use_cases::sync_projects::store::DOCUMENT_PATH;
    use crate::shared::infrastructure::content_store::in_memory::InMemoryContentStore;
    use crate::shared::infrastructure::local_cache::in_memory::InMemoryLocalCache;
    use crate::shell::http::router;
    use crate::shell::state::AppState;

    fn make_test_state() -> (Arc<InMemoryContentStore>, AppState) {
        let content = Arc::new(InMemoryContentStore::default());
        let cache = Arc::new(InMemoryLocalCache::new());
        let engine = Arc::new(DocumentSyncEngine::remote(content.clone(), cache));
        (content, AppState { engine })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn it_should_return_an_empty_list_on_first_run() {
        let (_content, state) = make_test_state();
        let (status, json) = send(
            router(state),
            Request::get("/projects").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"projects": [], "status": null}));
    }

    #[tokio::test]
    async fn it_should_return_201_with_the_new_project() {
        let (_content, state) = make_test_state();
        let (status, json) = send(
            router(state),
            post_json(
                "/projects",
                json!({"title": "A", "target": "100", "description": "d", "collected": 0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["saved"], json!(true));
        assert_eq!(json["status"], json!("Saved to the repository."));
        assert_eq!(json["project"]["title"], json!("A"));
        assert_eq!(json["project"]["image"], json!(null));
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_should_upload_an_attached_image() {
        let (_content, state) = make_test_state();
        let (status, json) = send(
            router(state),
            post_json(
                "/projects",
                json!({
                    "title": "A", "target": "100", "description": "d",
                    "image": {"file_name": "my photo!.png", "content_base64": "iVBORw=="}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let url = json["project"]["image"].as_str().unwrap();
        assert!(url.starts_with("memory://content/image/"));
        assert!(url.ends_with("_my_photo_.png"));
    }

    #[tokio::test]
    async fn it_should_return_400_for_an_image_that_is_not_base64() {
        let (_content, state) = make_test_state();
        let (status, _) = send(
            router(state),
            post_json(
                "/projects",
                json!({
                    "title": "A", "target": "100", "description": "d",
                    "image": {"file_name": "a.png", "content_base64": "***"}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_should_return_400_for_a_negative_amount() {
        let (_content, state) = make_test_state();
        let (status, json) = send(
            router(state),
            post_json(
                "/projects",
                json!({"title": "A", "target": "100", "description": "d", "collected": -3}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["status"].as_str().unwrap().contains("at least 0"));
    }

    #[tokio::test]
    async fn it_should_return_422_on_invalid_json() {
        let (_content, state) = make_test_state();
        let response = router(state)
            .oneshot(
                Request::post("/projects")
                    .header("content-type", "application/json")
                    .body(Body::from("not-json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn it_should_patch_only_the_given_fields() {
        let (_content, state) = make_test_state();
        let id = state
            .engine
            .add(
                serde_json::from_value(json!({"title": "A", "target": "100", "description": "d"}))
                    .unwrap(),
                None,
            )
            .await
            .unwrap()
            .project
            .unwrap()
            .id;

        let request = Request::patch(format!("/projects/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(json!({"title": "B"}).to_string()))
            .unwrap();
        let (status, json) = send(router(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["project"]["id"], json!(id));
        assert_eq!(json["project"]["title"], json!("B"));
        assert_eq!(json["project"]["target"], json!("100"));
    }

    #[tokio::test]
    async fn it_should_return_404_when_patching_an_unknown_project() {
        let (_content, state) = make_test_state();
        let request = Request::patch("/projects/p_404")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(router(state), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn it_should_only_delete_with_confirmation() {
        let (_content, state) = make_test_state();
        let id = state
            .engine
            .add(
                serde_json::from_value(json!({"title": "A", "target": "100", "description": "d"}))
                    .unwrap(),
                None,
            )
            .await
            .unwrap()
            .project
            .unwrap()
            .id;

        let (status, json) = send(
            router(state.clone()),
            Request::delete(format!("/projects/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], json!(false));
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);

        let (status, json) = send(
            router(state),
            Request::delete(format!("/projects/{id}?confirm=true"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], json!(true));
        assert_eq!(json["projects"], json!([]));
    }

    #[tokio::test]
    async fn it_should_report_a_failed_save_and_retry_it() {
        let (content, state) = make_test_state();
        content.set_offline(true);

        let (status, json) = send(
            router(state.clone()),
            post_json(
                "/projects",
                json!({"title": "A", "target": "100", "description": "d"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["saved"], json!(false));
        assert!(json["status"].as_str().unwrap().starts_with("Save failed"));

        content.set_offline(false);
        let (status, json) = send(
            router(state),
            Request::post("/projects/persist").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], json!(true));
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_should_reload_the_collection_from_the_remote() {
        let (content, state) = make_test_state();
        let (_, json) = send(
            router(state.clone()),
            Request::get("/projects").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(json["projects"], json!([]));
        let document = json!([{
            "id": "p_1", "title": "Roof", "target": "5000", "description": "d",
            "collected": 0, "image": null,
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }]);
        content
            .seed(DOCUMENT_PATH, document.to_string().as_bytes())
            .await;

        let (status, json) = send(
            router(state),
            Request::post("/projects/reload").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], json!(null));
        assert_eq!(json["projects"][0]["title"], json!("Roof"));
    }
}
