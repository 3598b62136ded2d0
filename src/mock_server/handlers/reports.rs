//! Report endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{created, error, report_href, report_json};
use crate::mock_server::state::MockState;

/// POST /api/projects/{id}/versions/{version_id}/reports
/// and POST /api/projects/{id}/versions/{version_id}/license-reports
pub async fn create_report(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_project_id, version_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    if !state.versions.contains_key(&version_id) {
        return error(StatusCode::NOT_FOUND, &format!("No version with id {version_id}"));
    }
    if body["versionId"].as_str() != Some(version_id.as_str()) {
        return error(StatusCode::BAD_REQUEST, "versionId does not match the version");
    }
    let (Some(format), Some(report_type)) =
        (body["reportFormat"].as_str(), body["reportType"].as_str())
    else {
        return error(StatusCode::BAD_REQUEST, "reportFormat and reportType are required");
    };

    let id = state.add_report(&version_id, format, report_type);
    created(report_href(&state.base_url, &id))
}

/// GET /api/reports/{id}
///
/// Each call counts as one status check.
pub async fn get_report(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    let Some(status) = state.poll_report(&id) else {
        return error(StatusCode::NOT_FOUND, &format!("No report with id {id}"));
    };
    Json(report_json(&state.base_url, &state.reports[&id], status)).into_response()
}

/// GET /api/reports/{id}/download
pub async fn download_report(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.reports.get(&id) {
        Some(report) if report.status() == "COMPLETED" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/zip")],
            report.content.clone(),
        )
            .into_response(),
        Some(_) => error(StatusCode::NOT_FOUND, "Report is not ready"),
        None => error(StatusCode::NOT_FOUND, &format!("No report with id {id}")),
    }
}

/// DELETE /api/reports/{id}
pub async fn delete_report(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    match state.write().await.reports.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("No report with id {id}")),
    }
}
