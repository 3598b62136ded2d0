//! Report generation and polling.
//!
//! Reports are built asynchronously by the server. A create request answers
//! `201 Created` with the report's status URL in `Location`; the job is then
//! polled until the server marks it `COMPLETED` (or `FAILED`), after which
//! the archive is fetched through the report's `download` link.
//!
//! ```text
//! Requested -> Polling -> Completed
//!                      -> Failed
//!                      -> TimedOut
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::{HubError, Result};
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::models::version::ProjectVersion;
use crate::retry::{self, Poll, RetryPolicy};
use crate::traits::Get;

/// Report status once the archive is ready.
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Report status when generation failed on the server.
pub const STATUS_FAILED: &str = "FAILED";

/// Sections that can be included in a version report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    Version,
    CodeLocations,
    Components,
    Security,
    Files,
    CryptoAlgorithms,
    ProjectVersionCustomFields,
    BomComponentCustomFields,
    LicenseTermFulfillment,
    UpgradeGuidance,
    LicenseConflicts,
}

impl ReportCategory {
    /// Every category, in the order the server lists them.
    pub const ALL: [ReportCategory; 11] = [
        ReportCategory::Version,
        ReportCategory::CodeLocations,
        ReportCategory::Components,
        ReportCategory::Security,
        ReportCategory::Files,
        ReportCategory::CryptoAlgorithms,
        ReportCategory::ProjectVersionCustomFields,
        ReportCategory::BomComponentCustomFields,
        ReportCategory::LicenseTermFulfillment,
        ReportCategory::UpgradeGuidance,
        ReportCategory::LicenseConflicts,
    ];
}

impl FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wire = s.trim().to_ascii_uppercase().replace('-', "_");
        serde_json::from_value(Value::String(wire))
            .map_err(|_| format!("unknown report category '{s}'"))
    }
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFormat {
    Csv,
    Json,
    /// Notices reports only.
    Text,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Csv => "CSV",
            ReportFormat::Json => "JSON",
            ReportFormat::Text => "TEXT",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CSV" => Ok(ReportFormat::Csv),
            "JSON" => Ok(ReportFormat::Json),
            "TEXT" => Ok(ReportFormat::Text),
            _ => Err(format!("unknown report format '{s}', expected CSV, JSON or TEXT")),
        }
    }
}

/// The server's view of a report job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// `IN_PROGRESS`, `COMPLETED` or `FAILED`.
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Report {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Report {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    pub fn is_failed(&self) -> bool {
        self.status == STATUS_FAILED
    }
}

#[async_trait]
impl Get for Report {
    type Id = String; // Report status URL

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, location: String) -> Result<Self> {
        client.get_json(&location, MediaType::Report).await
    }
}

/// Where a report job stands, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportState {
    /// The create request was accepted.
    Requested,
    /// At least one status check came back not ready.
    Polling,
    /// The archive is ready for download.
    Completed,
    /// The server gave up on the report.
    Failed,
    /// The retry budget ran out first.
    TimedOut,
}

/// A report being generated on the server.
#[derive(Debug, Clone)]
pub struct ReportJob {
    /// Status URL, from the create response's `Location` header.
    pub location: String,
    /// Last status reported by the server.
    pub status: Option<String>,
    /// Archive URL, known once the report completed.
    pub download_link: Option<String>,
    pub state: ReportState,
}

impl ReportJob {
    /// A freshly requested job.
    pub fn new(location: String) -> Self {
        Self {
            location,
            status: None,
            download_link: None,
            state: ReportState::Requested,
        }
    }

    /// Download the finished archive.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MissingLink`] if the job has not completed.
    #[tracing::instrument(skip(client), fields(location = %self.location))]
    pub async fn download(&self, client: &HubClient) -> Result<Vec<u8>> {
        let href = self
            .download_link
            .as_deref()
            .filter(|_| self.state == ReportState::Completed)
            .ok_or_else(|| HubError::MissingLink {
                rel: "download".to_string(),
            })?;

        let response = client.get(href, MediaType::Zip).await?;
        let response = HubClient::check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Delete the report from the server.
    pub async fn delete(&self, client: &HubClient) -> Result<()> {
        client.delete_resource(&self.location).await
    }

    fn apply(&mut self, report: &Report) {
        self.status = Some(report.status.clone());
        if report.is_completed() {
            self.download_link = report.link("download").map(str::to_string);
            self.state = ReportState::Completed;
        } else if report.is_failed() {
            self.state = ReportState::Failed;
        } else {
            self.state = ReportState::Polling;
        }
    }
}

/// Request a version report with the given sections.
///
/// # Errors
///
/// Returns [`HubError::MissingLink`] if the version cannot produce reports,
/// or [`HubError::ApiError`] carrying the server's status if the request is
/// not accepted with `201 Created`.
#[tracing::instrument(skip(client, version), fields(version = %version.version_name))]
pub async fn create_version_report(
    client: &HubClient,
    version: &ProjectVersion,
    categories: &[ReportCategory],
    format: ReportFormat,
) -> Result<ReportJob> {
    let href = version.require_link("versionReport")?;
    let body = serde_json::json!({
        "reportFormat": format,
        "locale": "en_US",
        "versionId": version_id(version)?,
        "categories": categories,
        "reportType": "VERSION",
    });
    let location = client.create(href, &body, MediaType::Report).await?;
    tracing::debug!("Report requested at {location}");
    Ok(ReportJob::new(location))
}

/// Request a notices (license and attribution) report.
///
/// # Errors
///
/// Same as [`create_version_report`].
#[tracing::instrument(skip(client, version), fields(version = %version.version_name))]
pub async fn create_notices_report(
    client: &HubClient,
    version: &ProjectVersion,
    format: ReportFormat,
    include_copyright: bool,
) -> Result<ReportJob> {
    let href = version.require_link("licenseReports")?;
    let mut body = serde_json::json!({
        "reportFormat": format,
        "locale": "en_US",
        "versionId": version_id(version)?,
        "reportType": "VERSION_LICENSE",
    });
    if include_copyright {
        body["categories"] = serde_json::json!(["COPYRIGHT_TEXT"]);
    }
    let location = client.create(href, &body, MediaType::Report).await?;
    tracing::debug!("Notices report requested at {location}");
    Ok(ReportJob::new(location))
}

fn version_id(version: &ProjectVersion) -> Result<String> {
    version.object_id().ok_or_else(|| HubError::MissingLink {
        rel: "self".to_string(),
    })
}

/// Polls report jobs until they finish.
#[derive(Debug, Clone, Default)]
pub struct ReportPoller {
    policy: RetryPolicy,
}

impl ReportPoller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Poll `job` until the server completes or fails it.
    ///
    /// The job's state is updated either way.
    ///
    /// # Errors
    ///
    /// - [`HubError::ReportFailed`] if the server reports `FAILED`;
    /// - [`HubError::Timeout`] if the budget runs out first.
    #[tracing::instrument(skip_all, fields(location = %job.location))]
    pub async fn wait(&self, client: &HubClient, job: &mut ReportJob) -> Result<()> {
        let location = job.location.as_str();
        let outcome = retry::poll(&self.policy, move |_| check_status(client, location)).await;

        match outcome {
            Ok(report) => {
                job.apply(&report);
                if job.download_link.is_none() {
                    return Err(HubError::MissingLink {
                        rel: "download".to_string(),
                    });
                }
                Ok(())
            }
            Err(HubError::ReportFailed { location, status }) => {
                job.status = Some(status.clone());
                job.state = ReportState::Failed;
                Err(HubError::ReportFailed { location, status })
            }
            Err(e @ HubError::Timeout { .. }) => {
                job.state = ReportState::TimedOut;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Wait for `job` and download its archive.
    pub async fn fetch(&self, client: &HubClient, job: &mut ReportJob) -> Result<Vec<u8>> {
        self.wait(client, job).await?;
        job.download(client).await
    }
}

/// One status check. Anything short of a 200 with a terminal status counts
/// as not ready yet.
async fn check_status(client: &HubClient, location: &str) -> Result<Poll<Report>> {
    let response = client.get(location, MediaType::Report).await?;
    if response.status() != StatusCode::OK {
        tracing::debug!(status = response.status().as_u16(), "Report status not available yet");
        return Ok(Poll::Pending);
    }

    let report: Report = HubClient::read_json(response).await?;
    if report.is_completed() {
        Ok(Poll::Ready(report))
    } else if report.is_failed() {
        Err(HubError::ReportFailed {
            location: location.to_string(),
            status: report.status,
        })
    } else {
        tracing::debug!(status = %report.status, "Report still generating");
        Ok(Poll::Pending)
    }
}
