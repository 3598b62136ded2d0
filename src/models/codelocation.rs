//! Code locations (uploaded scans) and scan upload.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::{HubError, Result};
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::models::version::ProjectVersion;
use crate::pagination::{fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::{Delete, Get, List};

const CODE_LOCATIONS_PATH: &str = "api/codelocations";
const SCAN_UPLOAD_PATH: &str = "api/scan/data/";

/// Server-side record of one uploaded scan, optionally mapped to a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLocation {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Href of the version this scan feeds, empty or absent when unmapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_project_version: Option<String>,

    /// Bytes scanned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for CodeLocation {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl CodeLocation {
    /// True when the scan feeds a project version.
    pub fn is_mapped(&self) -> bool {
        self.mapped_project_version
            .as_deref()
            .is_some_and(|href| !href.is_empty())
    }

    /// Map this code location to `version`.
    #[tracing::instrument(skip_all, fields(code_location = %self.name))]
    pub async fn map_to(&self, client: &HubClient, version: &ProjectVersion) -> Result<()> {
        let version_href = version.require_href()?;
        self.set_mapping(client, version_href).await
    }

    /// Remove this code location's version mapping.
    #[tracing::instrument(skip_all, fields(code_location = %self.name))]
    pub async fn unmap(&self, client: &HubClient) -> Result<()> {
        self.set_mapping(client, "").await
    }

    async fn set_mapping(&self, client: &HubClient, version_href: &str) -> Result<()> {
        let href = self.require_href()?;
        let mut updated = self.clone();
        updated.mapped_project_version = Some(version_href.to_string());
        client.update(href, &updated, MediaType::Scan).await
    }
}

/// Query parameters for listing code locations.
#[derive(Debug, Clone, Default)]
pub struct CodeLocationListQuery {
    /// Filter by name (server-side substring match).
    pub name: Option<String>,
}

#[async_trait]
impl Get for CodeLocation {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", CODE_LOCATIONS_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::Scan).await
    }
}

#[async_trait]
impl List for CodeLocation {
    type Query = CodeLocationListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let filters =
            QueryParams::new().with_opt("q", query.name.as_ref().map(|n| format!("name:{n}")));
        fetch_page(client, CODE_LOCATIONS_PATH, &filters, offset, limit, MediaType::Scan).await
    }
}

impl Delete for CodeLocation {}

/// Upload a scan document (`.jsonld` or `.bdio`), replacing any earlier
/// upload with the same code location name.
///
/// # Errors
///
/// Returns [`HubError::UnsupportedScanFile`] for an unsupported file extension,
/// [`HubError::Io`] if the file cannot be read, or an API error if the
/// server rejects the upload.
#[tracing::instrument(skip(client))]
pub async fn upload_scan(client: &HubClient, path: &Path) -> Result<()> {
    let media = MediaType::for_scan_file(path).ok_or_else(|| HubError::UnsupportedScanFile {
        path: path.to_path_buf(),
    })?;
    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(bytes = bytes.len(), "Uploading scan");

    let target = format!("{SCAN_UPLOAD_PATH}{}", QueryParams::new().with("mode", "replace"));
    let response = client.post_bytes(&target, bytes, media).await?;
    HubClient::check_response(response).await?;
    Ok(())
}
