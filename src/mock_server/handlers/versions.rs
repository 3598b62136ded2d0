//! Project version and BOM endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{created, error, version_href, version_json, ListQuery};
use crate::mock_server::state::MockState;

fn version_not_found(version_id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        &format!("No version with id {version_id}"),
    )
}

/// GET /api/projects/{id}/versions
pub async fn list_versions(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(project_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if !state.projects.contains_key(&project_id) {
        return error(StatusCode::NOT_FOUND, &format!("No project with id {project_id}"));
    }

    let items = state
        .list_versions(&project_id, query.filter("versionName"))
        .into_iter()
        .map(|v| version_json(&state.base_url, v))
        .collect();
    query.page(items).into_response()
}

/// POST /api/projects/{id}/versions
pub async fn create_version(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(project_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Some(version_name) = body["versionName"].as_str() else {
        return error(StatusCode::BAD_REQUEST, "versionName is required");
    };

    let mut state = state.write().await;
    if !state.projects.contains_key(&project_id) {
        return error(StatusCode::NOT_FOUND, &format!("No project with id {project_id}"));
    }
    if state
        .list_versions(&project_id, None)
        .iter()
        .any(|v| v.version_name == version_name)
    {
        return error(
            StatusCode::PRECONDITION_FAILED,
            &format!("Version '{version_name}' already exists"),
        );
    }

    let phase = body["phase"].as_str().unwrap_or("DEVELOPMENT");
    let distribution = body["distribution"].as_str().unwrap_or("EXTERNAL");
    let id = state.add_version(&project_id, version_name, phase, distribution);
    let href = version_href(&state.base_url, &state.versions[&id]);
    created(href)
}

/// GET /api/projects/{id}/versions/{version_id}
pub async fn get_version(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((project_id, version_id)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    match state.versions.get(&version_id) {
        Some(v) if v.project_id == project_id => {
            Json(version_json(&state.base_url, v)).into_response()
        }
        _ => version_not_found(&version_id),
    }
}

/// PUT /api/projects/{id}/versions/{version_id}
pub async fn update_version(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    let Some(version) = state.versions.get_mut(&version_id) else {
        return version_not_found(&version_id);
    };

    if let Some(name) = body["versionName"].as_str() {
        version.version_name = name.to_string();
    }
    if let Some(phase) = body["phase"].as_str() {
        version.phase = phase.to_string();
    }
    if let Some(distribution) = body["distribution"].as_str() {
        version.distribution = distribution.to_string();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /api/projects/{id}/versions/{version_id}
pub async fn delete_version(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
) -> Response {
    match state.write().await.versions.remove(&version_id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => version_not_found(&version_id),
    }
}

/// GET /api/projects/{id}/versions/{version_id}/components
///
/// Every version carries the same single-component BOM.
pub async fn list_bom_components(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Response {
    if !state.read().await.versions.contains_key(&version_id) {
        return version_not_found(&version_id);
    }
    let component = json!({
        "componentName": "OpenSSL",
        "componentVersionName": "1.1.1k",
        "licenses": [{ "licenseDisplay": "OpenSSL" }],
        "policyStatus": "NOT_IN_VIOLATION",
        "reviewStatus": "NOT_REVIEWED"
    });
    query.page(vec![component]).into_response()
}

/// GET /api/projects/{id}/versions/{version_id}/vulnerable-bom-components
pub async fn list_vulnerable_components(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Response {
    if !state.read().await.versions.contains_key(&version_id) {
        return version_not_found(&version_id);
    }
    let vulnerable = json!({
        "componentName": "OpenSSL",
        "componentVersionName": "1.1.1k",
        "vulnerabilityWithRemediation": {
            "vulnerabilityName": "CVE-2021-3711",
            "severity": "CRITICAL",
            "baseScore": 9.8,
            "remediationStatus": "NEW"
        }
    });
    query.page(vec![vulnerable]).into_response()
}

/// GET /api/projects/{id}/versions/{version_id}/policy-status
pub async fn get_policy_status(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
) -> Response {
    if !state.read().await.versions.contains_key(&version_id) {
        return version_not_found(&version_id);
    }
    Json(json!({
        "overallStatus": "NOT_IN_VIOLATION",
        "componentVersionStatusCounts": [
            { "name": "NOT_IN_VIOLATION", "value": 1 }
        ]
    }))
    .into_response()
}
