//! Roles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::Result;
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::pagination::{fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::List;

const ROLES_PATH: &str = "api/roles";

/// A role that can be granted to users and groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `server` for global roles, `project` for project-scoped roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Role {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Role {
    /// Find a role by exact name, ignoring case.
    pub async fn find_by_name(client: &HubClient, name: &str) -> Result<Option<Role>> {
        let roles = Role::list_all(client, &()).await?;
        Ok(roles.into_iter().find(|r| r.name.eq_ignore_ascii_case(name)))
    }
}

/// A role granted to a particular user or group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub name: String,

    /// Href of the granted role.
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
impl List for Role {
    type Query = ();

    async fn list_page(
        client: &HubClient,
        _query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        fetch_page(client, ROLES_PATH, &QueryParams::new(), offset, limit, MediaType::User).await
    }
}
