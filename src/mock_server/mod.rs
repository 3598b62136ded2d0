//! Mock hub server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the hub API
//! for integration and end-to-end testing. Unlike wiremock which mocks at the
//! HTTP level per-test, this server maintains state across requests, enabling
//! realistic workflow testing: log in, create a project, add a version,
//! request a report and poll it to completion.
//!
//! # Example
//!
//! ```ignore
//! use hubapi::mock_server::{Fixtures, MockServer};
//! use hubapi::{ConnectionConfig, HubClient, Project};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let config = ConnectionConfig::with_api_token(server.url(), Fixtures::API_TOKEN);
//!     let client = HubClient::connect(&config).await.unwrap();
//!
//!     // Server comes with default fixtures
//!     let project = Project::find_by_name(&client, "demo-app").await.unwrap();
//!     assert!(project.is_some());
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, ProjectRecord, ReportRecord, VersionRecord};
pub use state::{MOCK_BEARER_TOKEN, MOCK_CSRF_TOKEN};
