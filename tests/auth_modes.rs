//! Tests for the two login flows and the server version gate.
//!
//! Uses wiremock to stand in for the hub's login endpoints.

use hubapi::{ConnectOptions, ConnectionConfig, HubClient, HubError, MediaType};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn offline() -> ConnectOptions {
    ConnectOptions {
        write_config: false,
        ..Default::default()
    }
}

async fn mount_current_version(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": version })))
        .mount(server)
        .await;
}

async fn mount_token_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .and(header("Authorization", "token my-api-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-CSRF-TOKEN", "csrf-123")
                .set_body_json(json!({
                    "bearerToken": "exchanged-bearer",
                    "expiresInMilliseconds": 7_200_000
                })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_password_login_uses_cookie_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .and(body_string_contains("j_username=sysadmin"))
        .and(body_string_contains("j_password=secret"))
        .respond_with(ResponseTemplate::new(204).insert_header(
            "Set-Cookie",
            "AUTHORIZATION_BEARER=cookie-bearer; Path=/; secure; HttpOnly",
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_current_version(&server, "2023.10.0").await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("Authorization", "Bearer cookie-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalCount": 0, "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_password(&server.uri(), "sysadmin", "secret");
    let client = assert_ok!(HubClient::connect_with(&config, &offline()).await);
    assert_eq!(client.session().bearer_token(), "cookie-bearer");
    assert!(client.session().csrf_token().is_none());

    let response = client
        .get("api/projects", MediaType::ProjectDetail)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let requests = server.received_requests().await.unwrap();
    let api_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/projects")
        .unwrap();
    assert!(api_request.headers.get("X-CSRF-TOKEN").is_none());
    assert_eq!(
        api_request.headers.get("Cookie").unwrap(),
        "AUTHORIZATION_BEARER=cookie-bearer"
    );
}

#[tokio::test]
async fn test_token_login_sends_bearer_and_csrf() {
    let server = MockServer::start().await;

    mount_token_exchange(&server).await;
    mount_current_version(&server, "2021.4.1").await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("Authorization", "Bearer exchanged-bearer"))
        .and(header("X-CSRF-TOKEN", "csrf-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalCount": 0, "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let client = assert_ok!(HubClient::connect_with(&config, &offline()).await);
    assert_eq!(client.session().bearer_token(), "exchanged-bearer");
    assert_eq!(client.session().csrf_token(), Some("csrf-123"));

    let response = client
        .get("api/projects", MediaType::ProjectDetail)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let requests = server.received_requests().await.unwrap();
    let api_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/projects")
        .unwrap();
    assert!(api_request.headers.get("Cookie").is_none());
}

#[tokio::test]
async fn test_token_wins_when_both_credentials_present() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    mount_current_version(&server, "2023.10.0").await;
    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config: ConnectionConfig = serde_json::from_value(json!({
        "baseurl": server.uri(),
        "username": "sysadmin",
        "password": "secret",
        "api_token": "my-api-token"
    }))
    .unwrap();

    assert_ok!(HubClient::connect_with(&config, &offline()).await);
}

#[tokio::test]
async fn test_rejected_password_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_password(&server.uri(), "sysadmin", "wrong");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::InvalidCredentials(_)));
}

#[tokio::test]
async fn test_login_without_bearer_cookie_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(ResponseTemplate::new(204).insert_header("Set-Cookie", "JSESSIONID=abc; Path=/"))
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_password(&server.uri(), "sysadmin", "secret");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::InvalidCredentials(_)));
}

#[tokio::test]
async fn test_token_exchange_without_bearer_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expiresInMilliseconds": 0 })))
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "revoked");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::InvalidCredentials(_)));
}

#[tokio::test]
async fn test_unreachable_server() {
    // Nothing listens on port 1
    let config = ConnectionConfig::with_api_token("http://127.0.0.1:1", "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::Unreachable { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_old_server_is_unsupported() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    mount_current_version(&server, "4.8.2").await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    match err {
        HubError::UnsupportedVersion(version) => assert_eq!(version, "4.8.2"),
        other => panic!("Expected UnsupportedVersion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_version_endpoint_is_unsupported() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    match err {
        HubError::UnsupportedVersion(detail) => assert!(detail.contains("404"), "{detail}"),
        other => panic!("Expected UnsupportedVersion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_version_body_without_version_is_unsupported() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "build": "x" })))
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::UnsupportedVersion(_)), "got {err:?}");
}

#[tokio::test]
async fn test_non_json_version_body_is_unsupported() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::UnsupportedVersion(_)), "got {err:?}");
}

#[tokio::test]
async fn test_refused_version_check_is_invalid_credentials() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::InvalidCredentials(_)), "got {err:?}");
}

#[tokio::test]
async fn test_login_server_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_password(&server.uri(), "sysadmin", "secret");
    let err = assert_err!(HubClient::connect_with(&config, &offline()).await);
    assert!(matches!(err, HubError::ApiError { status_code: 503, .. }), "got {err:?}");
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_version_check_can_be_skipped() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/current-version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "4.8.2" })))
        .expect(0)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let options = ConnectOptions {
        write_config: false,
        check_version: false,
        ..Default::default()
    };
    assert_ok!(HubClient::connect_with(&config, &options).await);
}

#[tokio::test]
async fn test_successful_login_writes_config() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    mount_current_version(&server, "2023.10.0").await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(".restconfig.json");
    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let options = ConnectOptions {
        write_config: true,
        config_path: config_path.clone(),
        check_version: true,
    };

    assert_ok!(HubClient::connect_with(&config, &options).await);
    let saved = ConnectionConfig::load(&config_path).unwrap();
    assert_eq!(saved, config);
}

#[tokio::test]
async fn test_failed_login_does_not_write_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tokens/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(".restconfig.json");
    let config = ConnectionConfig::with_api_token(&server.uri(), "bad-token");
    let options = ConnectOptions {
        write_config: true,
        config_path: config_path.clone(),
        check_version: true,
    };

    assert_err!(HubClient::connect_with(&config, &options).await);
    assert!(!config_path.exists());
}

#[tokio::test]
async fn test_caller_headers_cannot_override_auth() {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    mount_current_version(&server, "2023.10.0").await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("Authorization", "Bearer exchanged-bearer"))
        .and(header("X-Trace", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectionConfig::with_api_token(&server.uri(), "my-api-token");
    let client = HubClient::connect_with(&config, &offline()).await.unwrap();

    let mut overrides = reqwest::header::HeaderMap::new();
    overrides.insert("Authorization", "Bearer spoofed".parse().unwrap());
    overrides.insert("X-Trace", "on".parse().unwrap());
    overrides.insert("Accept", "application/json".parse().unwrap());

    let response = client
        .execute(
            reqwest::Method::GET,
            "api/projects",
            MediaType::ProjectDetail,
            None,
            Some(&overrides),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let requests = server.received_requests().await.unwrap();
    let api_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/projects")
        .unwrap();
    assert_eq!(api_request.headers.get("Accept").unwrap(), "application/json");
}
