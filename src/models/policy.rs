//! Policy rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::HubClient;
use crate::error::Result;
use crate::links::{Meta, Resource};
use crate::media::MediaType;
use crate::pagination::{fetch_page, Page};
use crate::params::QueryParams;
use crate::traits::{Create, Delete, Get, List, Update};

const POLICY_RULES_PATH: &str = "api/policy-rules";

/// A policy rule evaluated against every BOM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub overridable: bool,

    /// e.g. `BLOCKER`, `CRITICAL`, `MAJOR`, `MINOR`, `TRIVIAL`, `UNSPECIFIED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Rule expression, kept as the server sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for PolicyRule {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// Query parameters for listing policy rules.
#[derive(Debug, Clone, Default)]
pub struct PolicyRuleListQuery {
    pub name: Option<String>,
}

/// Parameters for creating a policy rule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRuleCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub overridable: bool,
    pub severity: String,
    pub expression: Value,
}

/// Parameters for updating a policy rule.
#[derive(Debug, Clone, Default)]
pub struct PolicyRuleUpdateParams {
    pub enabled: Option<bool>,
    pub description: Option<String>,
    pub severity: Option<String>,
}

#[async_trait]
impl Get for PolicyRule {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", POLICY_RULES_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::Policy).await
    }
}

#[async_trait]
impl List for PolicyRule {
    type Query = PolicyRuleListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let filters =
            QueryParams::new().with_opt("q", query.name.as_ref().map(|n| format!("name:{n}")));
        fetch_page(client, POLICY_RULES_PATH, &filters, offset, limit, MediaType::Policy).await
    }
}

#[async_trait]
impl Create for PolicyRule {
    type Params = PolicyRuleCreateParams;

    #[tracing::instrument(skip(client, params), fields(rule = %params.name))]
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String> {
        client.create(POLICY_RULES_PATH, params, MediaType::Policy).await
    }
}

#[async_trait]
impl Update for PolicyRule {
    type Id = String; // Policy rule href
    type Params = PolicyRuleUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(client: &HubClient, href: String, params: Self::Params) -> Result<Self> {
        let mut rule: PolicyRule = client.get_json(&href, MediaType::Policy).await?;
        if let Some(enabled) = params.enabled {
            rule.enabled = enabled;
        }
        if let Some(description) = params.description {
            rule.description = Some(description);
        }
        if let Some(severity) = params.severity {
            rule.severity = Some(severity);
        }
        client.update(&href, &rule, MediaType::Policy).await?;
        Ok(rule)
    }
}

impl Delete for PolicyRule {}
