//! Project endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{created, error, project_href, project_json, ListQuery};
use crate::mock_server::state::MockState;

/// GET /api/projects
pub async fn list_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let state = state.read().await;
    let items = state
        .list_projects(query.filter("name"))
        .into_iter()
        .map(|p| project_json(&state.base_url, p))
        .collect();
    query.page(items)
}

/// POST /api/projects
///
/// Answers 412 when a project with the same name exists.
pub async fn create_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(body): Json<Value>,
) -> Response {
    let Some(name) = body["name"].as_str() else {
        return error(StatusCode::BAD_REQUEST, "Project name is required");
    };

    let mut state = state.write().await;
    if state.find_project(name).is_some() {
        return error(
            StatusCode::PRECONDITION_FAILED,
            &format!("A project with name '{name}' already exists"),
        );
    }

    let description = body["description"].as_str().map(str::to_string);
    let id = state.add_project(name, description);

    if let Some(request) = body.get("versionRequest") {
        let version_name = request["versionName"].as_str().unwrap_or("Default");
        let phase = request["phase"].as_str().unwrap_or("DEVELOPMENT");
        let distribution = request["distribution"].as_str().unwrap_or("EXTERNAL");
        state.add_version(&id, version_name, phase, distribution);
    }

    created(project_href(&state.base_url, &id))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.projects.get(&id) {
        Some(project) => Json(project_json(&state.base_url, project)).into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("No project with id {id}")),
    }
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    let Some(project) = state.projects.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, &format!("No project with id {id}"));
    };

    if let Some(name) = body["name"].as_str() {
        project.name = name.to_string();
    }
    project.description = body["description"].as_str().map(str::to_string);
    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    if state.write().await.delete_project(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, &format!("No project with id {id}"))
    }
}
