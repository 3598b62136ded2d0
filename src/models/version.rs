//! Project version model and trait implementations.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::{HubError, Result};
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::models::bom::{BomComponent, PolicyStatus, VulnerableComponent};
use crate::models::codelocation::CodeLocation;
use crate::models::project::Project;
use crate::pagination::{fetch_all, fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::{Create, Delete, Get, List, Update};

/// Lifecycle phase of a project version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Planning,
    Development,
    Prerelease,
    Released,
    Deprecated,
    Archived,
}

/// How a project version is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distribution {
    External,
    Saas,
    Internal,
    Opensource,
}

macro_rules! wire_enum_str {
    ($ty:ty, $kind:literal, [$($variant:ident => $wire:literal),+ $(,)?]) => {
        impl $ty {
            /// Value as sent on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "unknown {} '{}', expected one of: {}",
                        $kind,
                        s,
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

wire_enum_str!(Phase, "phase", [
    Planning => "PLANNING",
    Development => "DEVELOPMENT",
    Prerelease => "PRERELEASE",
    Released => "RELEASED",
    Deprecated => "DEPRECATED",
    Archived => "ARCHIVED",
]);

wire_enum_str!(Distribution, "distribution", [
    External => "EXTERNAL",
    Saas => "SAAS",
    Internal => "INTERNAL",
    Opensource => "OPENSOURCE",
]);

/// A version of a hub project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    /// Version name, unique within its project.
    pub version_name: String,

    /// Lifecycle phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,

    /// Distribution type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,

    /// Short alternate name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Release notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_comments: Option<String>,

    /// When the version was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Hypermedia block.
    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for ProjectVersion {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl ProjectVersion {
    /// The project this version belongs to.
    pub async fn project(&self, client: &HubClient) -> Result<Project> {
        client
            .follow(self, "project", MediaType::ProjectDetail)
            .await
    }

    /// Every component in this version's bill of materials.
    #[tracing::instrument(skip(self, client), fields(version = %self.version_name))]
    pub async fn components(&self, client: &HubClient) -> Result<Vec<BomComponent>> {
        let href = self.require_link("components")?;
        fetch_all(client, href, &QueryParams::new(), MediaType::Bom).await
    }

    /// BOM components that carry known vulnerabilities, one entry per
    /// component/vulnerability pair.
    #[tracing::instrument(skip(self, client), fields(version = %self.version_name))]
    pub async fn vulnerable_components(
        &self,
        client: &HubClient,
    ) -> Result<Vec<VulnerableComponent>> {
        let href = self.require_link("vulnerable-components")?;
        fetch_all(client, href, &QueryParams::new(), MediaType::Bom).await
    }

    /// Policy status summary of this version.
    pub async fn policy_status(&self, client: &HubClient) -> Result<PolicyStatus> {
        client
            .follow(self, "policy-status", MediaType::Bom)
            .await
    }

    /// Code locations (scans) mapped to this version.
    pub async fn code_locations(&self, client: &HubClient) -> Result<Vec<CodeLocation>> {
        let href = self.require_link("codelocations")?;
        fetch_all(client, href, &QueryParams::new(), MediaType::Scan).await
    }
}

/// Query parameters for listing the versions of a project.
#[derive(Debug, Clone, Default)]
pub struct VersionListQuery {
    /// The project's `versions` link.
    pub versions_href: String,

    /// Filter by version name (server-side substring match).
    pub name: Option<String>,
}

impl VersionListQuery {
    /// Query over all versions of `project`.
    pub fn for_project(project: &Project) -> Self {
        Self {
            versions_href: project.link("versions").unwrap_or_default().to_string(),
            name: None,
        }
    }

    /// Narrow the query to versions whose name contains `name`.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    fn to_params(&self) -> QueryParams {
        QueryParams::new().with_opt("q", self.name.as_ref().map(|n| format!("versionName:{n}")))
    }
}

/// Body describing a new version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRequest {
    pub version_name: String,
    pub phase: Phase,
    pub distribution: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl VersionRequest {
    /// A version in development, distributed externally.
    pub fn new(version_name: &str) -> Self {
        Self {
            version_name: version_name.to_string(),
            phase: Phase::Development,
            distribution: Distribution::External,
            nickname: None,
        }
    }
}

/// Parameters for creating a version under an existing project.
#[derive(Debug, Clone)]
pub struct VersionCreateParams {
    /// The project's `versions` link.
    pub versions_href: String,
    pub request: VersionRequest,
}

impl VersionCreateParams {
    /// Create `request` under `project`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MissingLink`] if the project has no `versions` link.
    pub fn for_project(project: &Project, request: VersionRequest) -> Result<Self> {
        Ok(Self {
            versions_href: project.require_link("versions")?.to_string(),
            request,
        })
    }
}

/// Parameters for updating a version.
#[derive(Debug, Clone, Default)]
pub struct VersionUpdateParams {
    pub version_name: Option<String>,
    pub phase: Option<Phase>,
    pub distribution: Option<Distribution>,
    pub nickname: Option<String>,
}

#[async_trait]
impl Get for ProjectVersion {
    type Id = String; // Version href; versions only exist under a project

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, href: String) -> Result<Self> {
        client.get_json(&href, MediaType::ProjectDetail5).await
    }
}

#[async_trait]
impl List for ProjectVersion {
    type Query = VersionListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        if query.versions_href.is_empty() {
            return Err(HubError::MissingLink {
                rel: "versions".to_string(),
            });
        }
        fetch_page(
            client,
            &query.versions_href,
            &query.to_params(),
            offset,
            limit,
            MediaType::ProjectDetail5,
        )
        .await
    }
}

#[async_trait]
impl Create for ProjectVersion {
    type Params = VersionCreateParams;

    #[tracing::instrument(skip(client, params), fields(version = %params.request.version_name))]
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String> {
        client
            .create(
                &params.versions_href,
                &params.request,
                MediaType::ProjectDetail5,
            )
            .await
    }
}

#[async_trait]
impl Update for ProjectVersion {
    type Id = String; // Version href
    type Params = VersionUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(client: &HubClient, href: String, params: Self::Params) -> Result<Self> {
        let mut version: ProjectVersion =
            client.get_json(&href, MediaType::ProjectDetail5).await?;

        if let Some(name) = params.version_name {
            version.version_name = name;
        }
        if let Some(phase) = params.phase {
            version.phase = Some(phase);
        }
        if let Some(distribution) = params.distribution {
            version.distribution = Some(distribution);
        }
        if let Some(nickname) = params.nickname {
            version.nickname = Some(nickname);
        }

        client
            .update(&href, &version, MediaType::ProjectDetail5)
            .await?;
        client.get_json(&href, MediaType::ProjectDetail5).await
    }
}

impl Delete for ProjectVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parse_and_display() {
        assert_eq!("released".parse::<Phase>().unwrap(), Phase::Released);
        assert_eq!(Phase::Prerelease.to_string(), "PRERELEASE");
        let err = "shipping".parse::<Phase>().unwrap_err();
        assert!(err.contains("PLANNING"));
    }

    #[test]
    fn test_distribution_serde() {
        assert_eq!(
            serde_json::to_value(Distribution::Opensource).unwrap(),
            "OPENSOURCE"
        );
        let d: Distribution = serde_json::from_value("SAAS".into()).unwrap();
        assert_eq!(d, Distribution::Saas);
    }

    #[test]
    fn test_version_request_body() {
        let body = serde_json::to_value(VersionRequest::new("1.0.0")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "versionName": "1.0.0",
                "phase": "DEVELOPMENT",
                "distribution": "EXTERNAL"
            })
        );
    }

    #[test]
    fn test_version_query_without_project_link() {
        let project: Project = serde_json::from_value(serde_json::json!({"name": "p"})).unwrap();
        assert!(VersionListQuery::for_project(&project).versions_href.is_empty());
        assert!(VersionCreateParams::for_project(&project, VersionRequest::new("1")).is_err());
    }

    #[test]
    fn test_version_query_params() {
        let query = VersionListQuery::default().named("2.0");
        assert_eq!(query.to_params().to_query_string(), "?q=versionName:2.0");
    }
}
