//! Login, token exchange and server version handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::error;
use crate::mock_server::state::{MockState, MOCK_BEARER_TOKEN, MOCK_CSRF_TOKEN};

/// Form posted to the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub j_username: String,
    pub j_password: String,
}

/// POST /j_spring_security_check
pub async fn login(
    State(state): State<Arc<RwLock<MockState>>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let state = state.read().await;
    if !state.accepts_password(&form.j_username, &form.j_password) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }

    let cookie = format!("AUTHORIZATION_BEARER={MOCK_BEARER_TOKEN}; Path=/; Secure; HttpOnly");
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}

/// POST /api/tokens/authenticate
pub async fn authenticate_token(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("token "))
        .unwrap_or_default();

    if !state.read().await.accepts_token(token) {
        return error(StatusCode::UNAUTHORIZED, "Invalid API token");
    }

    (
        StatusCode::OK,
        [("X-CSRF-TOKEN", MOCK_CSRF_TOKEN)],
        Json(serde_json::json!({
            "bearerToken": MOCK_BEARER_TOKEN,
            "expiresInMilliseconds": 7_200_000
        })),
    )
        .into_response()
}

/// GET /api/current-version
pub async fn current_version(State(state): State<Arc<RwLock<MockState>>>) -> Response {
    let version = state.read().await.server_version.clone();
    Json(serde_json::json!({ "version": version })).into_response()
}
