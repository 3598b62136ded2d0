//! Vendor media types.
//!
//! The server versions its representations per resource family and expects
//! the matching type in `Accept` (and `Content-Type` for writes). Each
//! facade operation picks the most widely supported type for its family.

/// A media type accepted by one family of endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// Plain `application/json`.
    Json,
    /// Projects and project versions.
    ProjectDetail,
    /// Newer project version representation (nickname, license).
    ProjectDetail5,
    /// Users, user groups and roles.
    User,
    /// Policy rules.
    Policy,
    /// Report jobs.
    Report,
    /// BOM components of a version.
    Bom,
    /// Vulnerability details.
    Vulnerability,
    /// Component catalogue.
    Component,
    /// Code locations (scans).
    Scan,
    /// Server metadata such as the current version.
    Admin,
    /// JSON-LD scan document upload.
    BdioJsonLd,
    /// Zipped scan document upload.
    BdioZip,
    /// Report archive download.
    Zip,
}

impl MediaType {
    /// The header value for this media type.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::ProjectDetail => "application/vnd.blackducksoftware.project-detail-4+json",
            MediaType::ProjectDetail5 => "application/vnd.blackducksoftware.project-detail-5+json",
            MediaType::User => "application/vnd.blackducksoftware.user-4+json",
            MediaType::Policy => "application/vnd.blackducksoftware.policy-5+json",
            MediaType::Report => "application/vnd.blackducksoftware.report-4+json",
            MediaType::Bom => "application/vnd.blackducksoftware.bill-of-materials-6+json",
            MediaType::Vulnerability => "application/vnd.blackducksoftware.vulnerability-4+json",
            MediaType::Component => "application/vnd.blackducksoftware.component-detail-4+json",
            MediaType::Scan => "application/vnd.blackducksoftware.scan-4+json",
            MediaType::Admin => "application/vnd.blackducksoftware.status-4+json",
            MediaType::BdioJsonLd => "application/ld+json",
            MediaType::BdioZip => "application/vnd.blackducksoftware.bdio+zip",
            MediaType::Zip => "application/zip",
        }
    }

    /// Media type for uploading a scan file, chosen by its extension.
    pub fn for_scan_file(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonld") => Some(MediaType::BdioJsonLd),
            Some("bdio") => Some(MediaType::BdioZip),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
