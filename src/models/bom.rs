//! Bill-of-materials views of a project version.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::links::{Meta, Resource};

/// A component in a version's bill of materials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomComponent {
    pub component_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_version_name: Option<String>,

    /// Href of the catalogue component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Href of the catalogue component version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_version: Option<String>,

    /// e.g. `IN_VIOLATION`, `NOT_IN_VIOLATION`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_status: Option<String>,

    /// e.g. `REVIEWED`, `NOT_REVIEWED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<BomLicense>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for BomComponent {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl BomComponent {
    /// License names joined for display.
    pub fn license_names(&self) -> String {
        self.licenses
            .iter()
            .filter_map(|l| l.license_display.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// License attached to a BOM component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomLicense {
    #[serde(default)]
    pub license_display: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A BOM component paired with one vulnerability affecting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerableComponent {
    pub component_name: String,

    #[serde(default)]
    pub component_version_name: Option<String>,

    #[serde(default)]
    pub vulnerability_with_remediation: Option<VulnerabilityWithRemediation>,

    #[serde(rename = "_meta", default)]
    pub meta: Meta,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for VulnerableComponent {
    fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// Vulnerability summary with its remediation state in this BOM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityWithRemediation {
    pub vulnerability_name: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub base_score: Option<f64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub remediation_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Policy status summary of a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatus {
    /// `IN_VIOLATION`, `NOT_IN_VIOLATION` or `IN_VIOLATION_OVERRIDDEN`.
    pub overall_status: String,

    #[serde(default)]
    pub component_version_status_counts: Vec<StatusCount>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolicyStatus {
    /// True when any component violates an active policy.
    pub fn in_violation(&self) -> bool {
        self.overall_status == "IN_VIOLATION"
    }
}

/// Number of components in a given policy state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_component_license_names() {
        let c: BomComponent = serde_json::from_value(serde_json::json!({
            "componentName": "openssl",
            "componentVersionName": "1.1.1k",
            "licenses": [
                {"licenseDisplay": "Apache-2.0", "license": "https://hub/api/licenses/1"},
                {"licenseDisplay": "OpenSSL"}
            ],
            "policyStatus": "NOT_IN_VIOLATION"
        }))
        .unwrap();
        assert_eq!(c.license_names(), "Apache-2.0, OpenSSL");
        assert_eq!(c.policy_status.as_deref(), Some("NOT_IN_VIOLATION"));
    }

    #[test]
    fn test_vulnerable_component_deserialize() {
        let v: VulnerableComponent = serde_json::from_value(serde_json::json!({
            "componentName": "lodash",
            "componentVersionName": "4.17.15",
            "vulnerabilityWithRemediation": {
                "vulnerabilityName": "CVE-2020-8203",
                "severity": "HIGH",
                "baseScore": 7.4,
                "remediationStatus": "NEW"
            }
        }))
        .unwrap();
        let vuln = v.vulnerability_with_remediation.unwrap();
        assert_eq!(vuln.vulnerability_name, "CVE-2020-8203");
        assert_eq!(vuln.base_score, Some(7.4));
    }

    #[test]
    fn test_policy_status() {
        let status: PolicyStatus = serde_json::from_value(serde_json::json!({
            "overallStatus": "IN_VIOLATION",
            "componentVersionStatusCounts": [{"name": "IN_VIOLATION", "value": 3}]
        }))
        .unwrap();
        assert!(status.in_violation());
        assert_eq!(status.component_version_status_counts[0].value, 3);
    }
}
