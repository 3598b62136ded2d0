//! Mock hub server.
//!
//! Provides an axum-based HTTP server that simulates the hub's login flows,
//! project and version endpoints, and asynchronous report generation.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// A mock hub server for testing.
///
/// The server runs in the background and can be used to test the hub client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server that only knows the default credentials.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(Fixtures::credentials_only()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(mut state: MockState) -> Self {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{}", addr);

        state.base_url = url.clone();
        let shared_state = state.shared();
        let app = create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Server error");
        });

        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL as the `baseurl` of a `ConnectionConfig`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// Create the axum router with all routes.
fn create_router(state: Arc<RwLock<MockState>>) -> Router {
    let api = Router::new()
        .route("/api/current-version", get(handlers::current_version))
        // Project routes
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/:id",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // Version routes
        .route(
            "/api/projects/:id/versions",
            get(handlers::list_versions).post(handlers::create_version),
        )
        .route(
            "/api/projects/:id/versions/:version_id",
            get(handlers::get_version)
                .put(handlers::update_version)
                .delete(handlers::delete_version),
        )
        .route(
            "/api/projects/:id/versions/:version_id/components",
            get(handlers::list_bom_components),
        )
        .route(
            "/api/projects/:id/versions/:version_id/vulnerable-bom-components",
            get(handlers::list_vulnerable_components),
        )
        .route(
            "/api/projects/:id/versions/:version_id/policy-status",
            get(handlers::get_policy_status),
        )
        // Report routes
        .route(
            "/api/projects/:id/versions/:version_id/reports",
            post(handlers::create_report),
        )
        .route(
            "/api/projects/:id/versions/:version_id/license-reports",
            post(handlers::create_report),
        )
        .route(
            "/api/reports/:id",
            get(handlers::get_report).delete(handlers::delete_report),
        )
        .route("/api/reports/:id/download", get(handlers::download_report))
        .route_layer(middleware::from_fn(handlers::require_bearer));

    Router::new()
        .route("/j_spring_security_check", post(handlers::login))
        .route("/api/tokens/authenticate", post(handlers::authenticate_token))
        .merge(api)
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::mock_server::state::{MOCK_BEARER_TOKEN, MOCK_CSRF_TOKEN};
    use crate::{ConnectOptions, ConnectionConfig, HubClient, List, Project, ProjectListQuery};

    fn router() -> Router {
        let mut state = Fixtures::default_scenario();
        state.base_url = "http://mock".to_string();
        create_router(state.shared())
    }

    fn no_side_effects() -> ConnectOptions {
        ConnectOptions {
            write_config: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_api_requires_bearer() {
        let response = router()
            .oneshot(
                Request::get("/api/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(
                Request::get("/api/projects")
                    .header(header::AUTHORIZATION, format!("Bearer {MOCK_BEARER_TOKEN}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_exchange_sets_csrf_header() {
        let response = router()
            .oneshot(
                Request::post("/api/tokens/authenticate")
                    .header(header::AUTHORIZATION, format!("token {}", Fixtures::API_TOKEN))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["X-CSRF-TOKEN"], MOCK_CSRF_TOKEN);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let response = router()
            .oneshot(
                Request::post("/j_spring_security_check")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("j_username=sysadmin&j_password=wrong"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_list_projects_with_hub_client() {
        let server = MockServer::start().await;
        let config = ConnectionConfig::with_api_token(server.url(), Fixtures::API_TOKEN);
        let client = HubClient::connect_with(&config, &no_side_effects())
            .await
            .expect("Failed to connect");

        let projects = Project::list_all(&client, &ProjectListQuery::default())
            .await
            .expect("Failed to list projects");

        assert_eq!(projects.len(), 3);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let config =
            ConnectionConfig::with_password(server.url(), Fixtures::USERNAME, Fixtures::PASSWORD);
        let client = HubClient::connect_with(&config, &no_side_effects())
            .await
            .expect("Failed to connect");

        let found = Project::find_by_name(&client, "demo-app").await.unwrap();
        assert!(found.is_none());

        server.shutdown().await;
    }
}
