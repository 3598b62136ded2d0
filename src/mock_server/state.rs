//! Mock server state management.
//!
//! Provides the in-memory data store for the mock hub server. Records are
//! kept in wire-neutral form; handlers render them with absolute hrefs
//! built from the server's own address.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bearer token issued by both login flows.
pub const MOCK_BEARER_TOKEN: &str = "mock-bearer-token";

/// CSRF token issued by the API-token exchange.
pub const MOCK_CSRF_TOKEN: &str = "mock-csrf-token";

/// A stored project.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A stored project version.
#[derive(Debug, Clone)]
pub struct VersionRecord {
    pub id: String,
    pub project_id: String,
    pub version_name: String,
    pub phase: String,
    pub distribution: String,
}

/// A report being "generated".
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub id: String,
    pub version_id: String,
    pub report_format: String,
    pub report_type: String,
    /// Status checks still answered with `IN_PROGRESS`.
    pub pending_polls: u32,
    /// Report ends in `FAILED` instead of `COMPLETED`.
    pub fails: bool,
    pub content: Vec<u8>,
}

impl ReportRecord {
    /// Current status, as the hub reports it.
    pub fn status(&self) -> &'static str {
        match (self.pending_polls, self.fails) {
            (0, true) => "FAILED",
            (0, false) => "COMPLETED",
            _ => "IN_PROGRESS",
        }
    }
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// Base URL the server listens on, used to build hrefs.
    pub base_url: String,

    /// Reported by `api/current-version`.
    pub server_version: String,

    /// Accepted `(username, password)` pairs.
    pub users: Vec<(String, String)>,

    /// Accepted API tokens.
    pub api_tokens: Vec<String>,

    /// Projects indexed by ID.
    pub projects: BTreeMap<String, ProjectRecord>,

    /// Versions indexed by ID.
    pub versions: BTreeMap<String, VersionRecord>,

    /// Reports indexed by ID.
    pub reports: BTreeMap<String, ReportRecord>,

    /// Status checks every new report answers with `IN_PROGRESS`.
    pub report_delay_polls: u32,

    /// New reports fail instead of completing.
    pub fail_reports: bool,

    next_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            server_version: "2023.10.0".to_string(),
            users: Vec::new(),
            api_tokens: Vec::new(),
            projects: BTreeMap::new(),
            versions: BTreeMap::new(),
            reports: BTreeMap::new(),
            report_delay_polls: 0,
            fail_reports: false,
            next_id: 1,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Accept a username/password login.
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    /// Accept an API token.
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_tokens.push(token.to_string());
        self
    }

    /// Report this server version.
    pub fn with_server_version(mut self, version: &str) -> Self {
        self.server_version = version.to_string();
        self
    }

    /// Make new reports answer `IN_PROGRESS` to their first `polls` status checks.
    pub fn with_report_delay(mut self, polls: u32) -> Self {
        self.report_delay_polls = polls;
        self
    }

    /// Make new reports fail.
    pub fn with_failing_reports(mut self) -> Self {
        self.fail_reports = true;
        self
    }

    /// Add a project, returning the state.
    pub fn with_project(mut self, name: &str, description: Option<&str>) -> Self {
        self.add_project(name, description.map(str::to_string));
        self
    }

    /// Add a version to the project called `project_name`.
    pub fn with_version(mut self, project_name: &str, version_name: &str) -> Self {
        if let Some(project_id) = self.find_project(project_name).map(|p| p.id.clone()) {
            self.add_version(&project_id, version_name, "DEVELOPMENT", "EXTERNAL");
        }
        self
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{:04}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Check a password login.
    pub fn accepts_password(&self, username: &str, password: &str) -> bool {
        self.users.iter().any(|(u, p)| u == username && p == password)
    }

    /// Check an API token.
    pub fn accepts_token(&self, token: &str) -> bool {
        self.api_tokens.iter().any(|t| t == token)
    }

    /// Store a new project and return its ID.
    pub fn add_project(&mut self, name: &str, description: Option<String>) -> String {
        let id = self.next_id("p");
        self.projects.insert(
            id.clone(),
            ProjectRecord {
                id: id.clone(),
                name: name.to_string(),
                description,
            },
        );
        id
    }

    /// Project with exactly this name.
    pub fn find_project(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.values().find(|p| p.name == name)
    }

    /// Projects whose name contains `filter`, ignoring case.
    pub fn list_projects(&self, filter: Option<&str>) -> Vec<&ProjectRecord> {
        self.projects
            .values()
            .filter(|p| {
                filter
                    .map(|f| p.name.to_lowercase().contains(&f.to_lowercase()))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Remove a project and its versions.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let removed = self.projects.remove(id).is_some();
        self.versions.retain(|_, v| v.project_id != id);
        removed
    }

    /// Store a new version and return its ID.
    pub fn add_version(
        &mut self,
        project_id: &str,
        version_name: &str,
        phase: &str,
        distribution: &str,
    ) -> String {
        let id = self.next_id("v");
        self.versions.insert(
            id.clone(),
            VersionRecord {
                id: id.clone(),
                project_id: project_id.to_string(),
                version_name: version_name.to_string(),
                phase: phase.to_string(),
                distribution: distribution.to_string(),
            },
        );
        id
    }

    /// Versions of a project whose name contains `filter`.
    pub fn list_versions(&self, project_id: &str, filter: Option<&str>) -> Vec<&VersionRecord> {
        self.versions
            .values()
            .filter(|v| v.project_id == project_id)
            .filter(|v| filter.map(|f| v.version_name.contains(f)).unwrap_or(true))
            .collect()
    }

    /// Start a report for a version and return its ID.
    pub fn add_report(&mut self, version_id: &str, report_format: &str, report_type: &str) -> String {
        let id = self.next_id("r");
        let content = format!("{report_type} report for {version_id} ({report_format})").into_bytes();
        self.reports.insert(
            id.clone(),
            ReportRecord {
                id: id.clone(),
                version_id: version_id.to_string(),
                report_format: report_format.to_string(),
                report_type: report_type.to_string(),
                pending_polls: self.report_delay_polls,
                fails: self.fail_reports,
                content,
            },
        );
        id
    }

    /// Record a status check of a report and return the status it saw.
    pub fn poll_report(&mut self, id: &str) -> Option<&'static str> {
        let report = self.reports.get_mut(id)?;
        let status = report.status();
        report.pending_polls = report.pending_polls.saturating_sub(1);
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_add_and_find_project() {
        let state = MockState::new().with_project("demo", Some("A demo"));

        let project = state.find_project("demo");
        assert!(project.is_some());
        assert_eq!(project.unwrap().description.as_deref(), Some("A demo"));
        assert!(state.find_project("dem").is_none());
    }

    #[test]
    fn test_state_list_projects_with_filter() {
        let state = MockState::new()
            .with_project("alpha-service", None)
            .with_project("beta-service", None)
            .with_project("gamma-tool", None);

        assert_eq!(state.list_projects(None).len(), 3);
        assert_eq!(state.list_projects(Some("SERVICE")).len(), 2);
        assert_eq!(state.list_projects(Some("gamma")).len(), 1);
    }

    #[test]
    fn test_delete_project_removes_versions() {
        let mut state = MockState::new()
            .with_project("demo", None)
            .with_version("demo", "1.0");
        let id = state.find_project("demo").unwrap().id.clone();
        assert_eq!(state.list_versions(&id, None).len(), 1);

        assert!(state.delete_project(&id));
        assert!(state.versions.is_empty());
    }

    #[test]
    fn test_report_completes_after_delay() {
        let mut state = MockState::new().with_report_delay(2);
        let id = state.add_report("v-1", "CSV", "VERSION");

        assert_eq!(state.poll_report(&id), Some("IN_PROGRESS"));
        assert_eq!(state.poll_report(&id), Some("IN_PROGRESS"));
        assert_eq!(state.poll_report(&id), Some("COMPLETED"));
        assert_eq!(state.poll_report(&id), Some("COMPLETED"));
        assert_eq!(state.poll_report("r-missing"), None);
    }
}
