//! Test data fixtures for the mock server.
//!
//! Provides the credentials and catalogue the default mock server starts with.

use super::state::MockState;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// Username accepted by the default server.
    pub const USERNAME: &'static str = "sysadmin";

    /// Password accepted by the default server.
    pub const PASSWORD: &'static str = "blackduck";

    /// API token accepted by the default server.
    pub const API_TOKEN: &'static str = "mock-api-token";

    /// State with the default credentials and no projects.
    pub fn credentials_only() -> MockState {
        MockState::new()
            .with_user(Self::USERNAME, Self::PASSWORD)
            .with_api_token(Self::API_TOKEN)
    }

    /// The default scenario.
    ///
    /// - `demo-app` with versions `1.0` and `2.0`
    /// - `payments` with version `main`
    /// - `legacy-tool` with no versions
    pub fn default_scenario() -> MockState {
        Self::credentials_only()
            .with_project("demo-app", Some("Demo application"))
            .with_version("demo-app", "1.0")
            .with_version("demo-app", "2.0")
            .with_project("payments", Some("Payments backend"))
            .with_version("payments", "main")
            .with_project("legacy-tool", None)
    }

    /// Default scenario whose reports need `polls` checks before completing.
    pub fn slow_reports(polls: u32) -> MockState {
        Self::default_scenario().with_report_delay(polls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let state = Fixtures::default_scenario();
        assert_eq!(state.projects.len(), 3);
        assert_eq!(state.versions.len(), 3);
        assert!(state.accepts_password(Fixtures::USERNAME, Fixtures::PASSWORD));
        assert!(state.accepts_token(Fixtures::API_TOKEN));
        assert!(!state.accepts_token("wrong"));

        let demo = state.find_project("demo-app").unwrap();
        assert_eq!(state.list_versions(&demo.id, None).len(), 2);
    }
}
