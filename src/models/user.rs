//! Users, user groups and role assignments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::Result;
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::models::role::{Role, RoleAssignment};
use crate::pagination::{fetch_all, fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::{Create, Delete, Get, List};

const USERS_PATH: &str = "api/users";
const USER_GROUPS_PATH: &str = "api/usergroups";

/// A hub user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub active: bool,

    /// `INTERNAL` or `EXTERNAL` (directory-backed).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for User {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl User {
    /// Find a user by exact user name.
    #[tracing::instrument(skip(client))]
    pub async fn find_by_username(client: &HubClient, user_name: &str) -> Result<Option<User>> {
        let query = UserListQuery {
            user_name: Some(user_name.to_string()),
        };
        let users = User::list_all(client, &query).await?;
        Ok(users.into_iter().find(|u| u.user_name == user_name))
    }

    /// Roles currently assigned to this user.
    pub async fn roles(&self, client: &HubClient) -> Result<Vec<RoleAssignment>> {
        let href = self.require_link("roles")?;
        fetch_all(client, href, &QueryParams::new(), MediaType::User).await
    }

    /// Assign a global `role` to this user.
    #[tracing::instrument(skip_all, fields(user = %self.user_name, role = %role.name))]
    pub async fn assign_role(&self, client: &HubClient, role: &Role) -> Result<String> {
        let href = self.require_link("roles")?;
        let body = serde_json::json!({ "role": role.require_href()? });
        client.create(href, &body, MediaType::User).await
    }
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Filter by user name (server-side substring match).
    pub user_name: Option<String>,
}

/// Parameters for creating a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateParams {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub active: bool,
}

#[async_trait]
impl Get for User {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", USERS_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::User).await
    }
}

#[async_trait]
impl List for User {
    type Query = UserListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let filters = QueryParams::new()
            .with_opt("q", query.user_name.as_ref().map(|n| format!("userName:{n}")));
        fetch_page(client, USERS_PATH, &filters, offset, limit, MediaType::User).await
    }
}

#[async_trait]
impl Create for User {
    type Params = UserCreateParams;

    #[tracing::instrument(skip(client, params), fields(user = %params.user_name))]
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String> {
        client.create(USERS_PATH, params, MediaType::User).await
    }
}

impl Delete for User {}

/// A group of users sharing role assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    pub name: String,

    #[serde(default)]
    pub active: bool,

    /// `INTERNAL` or `EXTERNAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for UserGroup {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl UserGroup {
    /// Find a group by exact name.
    #[tracing::instrument(skip(client))]
    pub async fn find_by_name(client: &HubClient, name: &str) -> Result<Option<UserGroup>> {
        let query = UserGroupListQuery {
            name: Some(name.to_string()),
        };
        let groups = UserGroup::list_all(client, &query).await?;
        Ok(groups.into_iter().find(|g| g.name == name))
    }

    /// Members of this group.
    pub async fn users(&self, client: &HubClient) -> Result<Vec<User>> {
        let href = self.require_link("users")?;
        fetch_all(client, href, &QueryParams::new(), MediaType::User).await
    }

    /// Add `users` to this group.
    #[tracing::instrument(skip_all, fields(group = %self.name, count = users.len()))]
    pub async fn add_users(&self, client: &HubClient, users: &[User]) -> Result<()> {
        let href = self.require_link("users")?;
        let body = users
            .iter()
            .map(|u| Ok(serde_json::json!({ "user": u.require_href()? })))
            .collect::<Result<Vec<_>>>()?;
        let response = client.post(href, &body, MediaType::User).await?;
        HubClient::check_response(response).await?;
        Ok(())
    }
}

/// Query parameters for listing user groups.
#[derive(Debug, Clone, Default)]
pub struct UserGroupListQuery {
    pub name: Option<String>,
}

/// Parameters for creating a user group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupCreateParams {
    pub name: String,
    pub active: bool,
    pub created_from: String,
}

impl UserGroupCreateParams {
    /// An active, internally managed group.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            created_from: "INTERNAL".to_string(),
        }
    }
}

#[async_trait]
impl List for UserGroup {
    type Query = UserGroupListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let filters =
            QueryParams::new().with_opt("q", query.name.as_ref().map(|n| format!("name:{n}")));
        fetch_page(client, USER_GROUPS_PATH, &filters, offset, limit, MediaType::User).await
    }
}

#[async_trait]
impl Create for UserGroup {
    type Params = UserGroupCreateParams;

    #[tracing::instrument(skip(client, params), fields(group = %params.name))]
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String> {
        client.create(USER_GROUPS_PATH, params, MediaType::User).await
    }
}

impl Delete for UserGroup {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize() {
        let user: User = serde_json::from_value(serde_json::json!({
            "userName": "jdoe",
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jdoe@example.com",
            "active": true,
            "type": "INTERNAL",
            "_meta": {"href": "https://hub/api/users/42", "links": [
                {"rel": "roles", "href": "https://hub/api/users/42/roles"}
            ]}
        }))
        .unwrap();
        assert_eq!(user.user_name, "jdoe");
        assert_eq!(user.user_type.as_deref(), Some("INTERNAL"));
        assert_eq!(user.link("roles"), Some("https://hub/api/users/42/roles"));
    }

    #[test]
    fn test_create_params_omit_missing_password() {
        let params = UserCreateParams {
            user_name: "jdoe".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: None,
            password: None,
            active: true,
        };
        let body = serde_json::to_value(&params).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["userName"], "jdoe");
    }

    #[test]
    fn test_group_create_defaults() {
        let body = serde_json::to_value(UserGroupCreateParams::new("auditors")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "auditors", "active": true, "createdFrom": "INTERNAL"})
        );
    }
}
