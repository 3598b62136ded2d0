//! Project model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::Result;
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::models::version::{ProjectVersion, VersionListQuery, VersionRequest};
use crate::pagination::{fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::{Create, Delete, Get, List, Update};

const PROJECTS_PATH: &str = "api/projects";

/// A hub project.
///
/// Projects are the top-level containers for analyzed software. Each
/// project has one or more versions, and each version carries its own
/// bill of materials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The project name, unique on the server.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether BOM adjustments apply to all versions of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_level_adjustments: Option<bool>,

    /// Project tier (1-5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_tier: Option<u8>,

    /// When the project was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the project was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Hypermedia block.
    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    /// Fields this client does not model, kept so updates send them back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Project {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Project {
    /// Find a project by its exact name.
    ///
    /// The server's name filter is a substring match, so results are
    /// narrowed to an exact match locally.
    #[tracing::instrument(skip(client))]
    pub async fn find_by_name(client: &HubClient, name: &str) -> Result<Option<Project>> {
        let query = ProjectListQuery::named(name);
        let projects = Project::list_all(client, &query).await?;
        Ok(projects.into_iter().find(|p| p.name == name))
    }

    /// Get all versions of this project.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let project = Project::find_by_name(&client, "demo").await?.unwrap();
    /// for version in project.versions(&client).await? {
    ///     println!("{} ({:?})", version.version_name, version.phase);
    /// }
    /// ```
    pub async fn versions(&self, client: &HubClient) -> Result<Vec<ProjectVersion>> {
        ProjectVersion::list_all(client, &VersionListQuery::for_project(self)).await
    }

    /// Find a version of this project by its exact name.
    pub async fn find_version(
        &self,
        client: &HubClient,
        version_name: &str,
    ) -> Result<Option<ProjectVersion>> {
        let query = VersionListQuery::for_project(self).named(version_name);
        let versions = ProjectVersion::list_all(client, &query).await?;
        Ok(versions
            .into_iter()
            .find(|v| v.version_name == version_name))
    }
}

/// Query parameters for listing projects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListQuery {
    /// Filter by project name (server-side substring match).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Sort order, e.g. `name ASC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl ProjectListQuery {
    /// Query filtering by name.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Render as request parameters.
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("q", self.name.as_ref().map(|n| format!("name:{n}")))
            .with_opt("sort", self.sort.as_ref())
    }
}

/// Parameters for creating a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateParams {
    /// Project name.
    pub name: String,

    /// Project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether BOM adjustments apply project-wide.
    pub project_level_adjustments: bool,

    /// Initial version to create along with the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_request: Option<VersionRequest>,
}

impl ProjectCreateParams {
    /// Parameters for a bare project with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            project_level_adjustments: true,
            version_request: None,
        }
    }
}

/// Parameters for updating a project.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdateParams {
    /// New project name.
    pub name: Option<String>,

    /// New project description.
    pub description: Option<String>,

    /// New project tier.
    pub project_tier: Option<u8>,
}

#[async_trait]
impl Get for Project {
    type Id = String; // Project ID (last segment of its href)

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", PROJECTS_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::ProjectDetail).await
    }
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        fetch_page(
            client,
            PROJECTS_PATH,
            &query.to_params(),
            offset,
            limit,
            MediaType::ProjectDetail,
        )
        .await
    }
}

#[async_trait]
impl Create for Project {
    type Params = ProjectCreateParams;

    #[tracing::instrument(skip(client, params), fields(name = %params.name))]
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String> {
        client
            .create(PROJECTS_PATH, params, MediaType::ProjectDetail)
            .await
    }
}

#[async_trait]
impl Update for Project {
    type Id = String; // Project href
    type Params = ProjectUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(client: &HubClient, href: String, params: Self::Params) -> Result<Self> {
        let mut project: Project = client.get_json(&href, MediaType::ProjectDetail).await?;

        if let Some(name) = params.name {
            project.name = name;
        }
        if let Some(description) = params.description {
            project.description = Some(description);
        }
        if let Some(tier) = params.project_tier {
            project.project_tier = Some(tier);
        }

        client
            .update(&href, &project, MediaType::ProjectDetail)
            .await?;
        client.get_json(&href, MediaType::ProjectDetail).await
    }
}

impl Delete for Project {}
