//! Component catalogue and vulnerabilities.

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
use crate::traits::{Get, List};

const COMPONENTS_PATH: &str = "api/components";
const VULNERABILITIES_PATH: &str = "api/vulnerabilities";

/// An open-source component known to the server's catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project home page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<String>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Component {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// One hit from a catalogue search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSearchHit {
    pub component_name: String,

    #[serde(default)]
    pub version_name: Option<String>,

    /// Href of the matched component.
    #[serde(default)]
    pub component: Option<String>,

    /// Href of the matched version, for version-specific queries.
    #[serde(default)]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Catalogue search query, e.g. `maven:org.apache.commons:commons-lang3:3.12.0`
/// or a plain name.
#[derive(Debug, Clone, Default)]
pub struct ComponentSearchQuery {
    pub q: String,
}

#[async_trait]
impl Get for Component {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", COMPONENTS_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::Component).await
    }
}

#[async_trait]
impl List for ComponentSearchHit {
    type Query = ComponentSearchQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &HubClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let filters = QueryParams::new().with("q", &query.q);
        fetch_page(client, COMPONENTS_PATH, &filters, offset, limit, MediaType::Component).await
    }
}

/// A vulnerability record (CVE or vendor advisory).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,

    /// `NVD` or `BDSA`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Vulnerability {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

#[async_trait]
impl Get for Vulnerability {
    type Id = String; // e.g. "CVE-2021-44228" or "BDSA-2021-3729"

    #[tracing::instrument(skip(client))]
    async fn get(client: &HubClient, id: String) -> Result<Self> {
        let path = format!("{}/{}", VULNERABILITIES_PATH, urlencoding::encode(&id));
        client.get_json(&path, MediaType::Vulnerability).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulnerability_deserialize() {
        let v: Vulnerability = serde_json::from_value(serde_json::json!({
            "name": "CVE-2021-44228",
            "severity": "CRITICAL",
            "baseScore": 10.0,
            "source": "NVD",
            "publishedDate": "2021-12-10T10:15:09.143Z",
            "cvss3": {"baseScore": 10.0}
        }))
        .unwrap();
        assert_eq!(v.name, "CVE-2021-44228");
        assert_eq!(v.base_score, Some(10.0));
        assert!(v.published_date.is_some());
        assert!(v.extra.contains_key("cvss3"));
    }

    #[test]
    fn test_search_hit_deserialize() {
        let hit: ComponentSearchHit = serde_json::from_value(serde_json::json!({
            "componentName": "Apache Commons Lang",
            "versionName": "3.12.0",
            "component": "https://hub/api/components/c1",
            "version": "https://hub/api/components/c1/versions/v1",
            "originId": "org.apache.commons:commons-lang3:3.12.0"
        }))
        .unwrap();
        assert_eq!(hit.version_name.as_deref(), Some("3.12.0"));
        assert_eq!(hit.extra["originId"], "org.apache.commons:commons-lang3:3.12.0");
    }
}
