//! Black Duck Hub API client library.
//!
//! A Rust library for talking to a Hub-style software composition analysis
//! server. Each operation (Get, List, Create, Update, Delete) is a trait that
//! resource types implement, on top of a single authenticated [`HubClient`].
//!
//! # Quick Start
//!
//! ```no_run
//! use hubapi::{ConnectionConfig, HubClient, List, Project, ProjectListQuery};
//!
//! #[tokio::main]
//! async fn main() -> hubapi::Result<()> {
//!     // Reads .restconfig.json from the working directory
//!     let config = ConnectionConfig::load(ConnectionConfig::default_path())?;
//!     let client = HubClient::connect(&config).await?;
//!
//!     let projects = Project::list_all(&client, &ProjectListQuery::default()).await?;
//!     println!("Found {} projects", projects.len());
//!
//!     if let Some(project) = Project::find_by_name(&client, "my-app").await? {
//!         for version in project.versions(&client).await? {
//!             println!("{} {}", project.name, version.version_name);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`auth`] establishes a [`Session`] with a username/password or an API token.
//! - [`HubClient`] sends every request with the session's headers and the
//!   media type the endpoint expects.
//! - Resources carry their `_meta` links; the [`Resource`] trait navigates them.
//! - Long-running reports are polled with a [`RetryPolicy`] by [`ReportPoller`].
//!
//! # Configuration
//!
//! Connection settings live in a JSON file, `.restconfig.json` by default:
//!
//! ```json
//! { "baseurl": "https://hub.example.com", "api_token": "...", "insecure": false }
//! ```
//!
//! `username` and `password` may replace `api_token`. The client rewrites the
//! file after connecting successfully unless told not to.

pub mod auth;
pub mod cli;
mod client;
mod config;
mod error;
pub mod links;
mod media;
mod models;
pub mod output;
mod pagination;
mod params;
pub mod retry;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use auth::Session;
pub use client::{Body, ConnectOptions, HubClient};
pub use config::{ConnectionConfig, Credential, DEFAULT_CONFIG_FILE};
pub use error::{HubError, Result};
pub use links::{Link, Meta, Resource};
pub use media::MediaType;
pub use pagination::Page;
pub use params::QueryParams;
pub use retry::{Poll, RetryPolicy};

// Re-export traits
pub use traits::{Create, Delete, Get, List, Update, DEFAULT_PAGE_SIZE};

// Re-export models
pub use models::{
    // Project types
    Project,
    ProjectCreateParams,
    ProjectListQuery,
    ProjectUpdateParams,
    // Version types
    Distribution,
    Phase,
    ProjectVersion,
    VersionCreateParams,
    VersionListQuery,
    VersionRequest,
    VersionUpdateParams,
    // BOM types
    BomComponent,
    BomLicense,
    PolicyStatus,
    StatusCount,
    VulnerabilityWithRemediation,
    VulnerableComponent,
    // User types
    Role,
    RoleAssignment,
    User,
    UserCreateParams,
    UserGroup,
    UserGroupCreateParams,
    UserGroupListQuery,
    UserListQuery,
    // Policy types
    PolicyRule,
    PolicyRuleCreateParams,
    PolicyRuleListQuery,
    PolicyRuleUpdateParams,
    // Catalogue types
    Component,
    ComponentSearchHit,
    ComponentSearchQuery,
    Vulnerability,
    // Scan types
    CodeLocation,
    CodeLocationListQuery,
    // Report types
    Report,
    ReportCategory,
    ReportFormat,
    ReportJob,
    ReportPoller,
    ReportState,
};

// Re-export convenience functions
pub use models::{create_notices_report, create_version_report, upload_scan};
