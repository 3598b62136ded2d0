//! HTTP request handlers for the mock server.

pub mod projects;
pub mod reports;
pub mod session;
pub mod versions;

pub use projects::*;
pub use reports::*;
pub use session::*;
pub use versions::*;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::state::{ProjectRecord, ReportRecord, VersionRecord, MOCK_BEARER_TOKEN};

/// Collection query shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Value of a `q=<key>:<value>` filter.
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.q
            .as_deref()
            .and_then(|q| q.strip_prefix(key))
            .and_then(|rest| rest.strip_prefix(':'))
    }

    /// Render `items` as one page of a hub collection.
    pub fn page(&self, items: Vec<Value>) -> Json<Value> {
        let total = items.len();
        let page: Vec<Value> = items
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(100))
            .collect();
        Json(json!({ "totalCount": total, "items": page }))
    }
}

/// Rejects API requests that lack the issued bearer token.
pub async fn require_bearer(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {MOCK_BEARER_TOKEN}");
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);

    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "Bearer token required");
    }
    next.run(request).await
}

/// JSON error body in the hub's shape.
pub fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "errorMessage": message, "errorCode": format!("{}", status.as_u16()) })),
    )
        .into_response()
}

/// `201 Created` pointing at `location`.
pub fn created(location: String) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

fn link(rel: &str, href: String) -> Value {
    json!({ "rel": rel, "href": href })
}

pub(crate) fn project_href(base: &str, id: &str) -> String {
    format!("{base}/api/projects/{id}")
}

pub(crate) fn version_href(base: &str, version: &VersionRecord) -> String {
    format!(
        "{}/versions/{}",
        project_href(base, &version.project_id),
        version.id
    )
}

pub(crate) fn report_href(base: &str, id: &str) -> String {
    format!("{base}/api/reports/{id}")
}

pub(crate) fn project_json(base: &str, project: &ProjectRecord) -> Value {
    let href = project_href(base, &project.id);
    json!({
        "name": project.name,
        "description": project.description,
        "projectLevelAdjustments": true,
        "source": "CUSTOM",
        "_meta": {
            "allow": ["GET", "PUT", "DELETE"],
            "href": href,
            "links": [link("versions", format!("{href}/versions"))]
        }
    })
}

pub(crate) fn version_json(base: &str, version: &VersionRecord) -> Value {
    let href = version_href(base, version);
    json!({
        "versionName": version.version_name,
        "phase": version.phase,
        "distribution": version.distribution,
        "source": "CUSTOM",
        "_meta": {
            "allow": ["GET", "PUT", "DELETE"],
            "href": href,
            "links": [
                link("project", project_href(base, &version.project_id)),
                link("components", format!("{href}/components")),
                link("vulnerable-components", format!("{href}/vulnerable-bom-components")),
                link("policy-status", format!("{href}/policy-status")),
                link("versionReport", format!("{href}/reports")),
                link("licenseReports", format!("{href}/license-reports")),
                link("codelocations", format!("{href}/codelocations")),
            ]
        }
    })
}

pub(crate) fn report_json(base: &str, report: &ReportRecord, status: &str) -> Value {
    let href = report_href(base, &report.id);
    let links = if status == "COMPLETED" {
        vec![link("download", format!("{href}/download"))]
    } else {
        Vec::new()
    };
    json!({
        "status": status,
        "reportFormat": report.report_format,
        "reportType": report.report_type,
        "fileName": format!("{}.zip", report.id),
        "_meta": { "href": href, "links": links }
    })
}
