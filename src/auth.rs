//! Session authentication.
//!
//! Two flows produce a [`Session`]:
//!
//! - **Password**: the credentials are posted to the login form and the
//!   bearer token comes back in an `AUTHORIZATION_BEARER` cookie.
//! - **API token**: the token is exchanged at `api/tokens/authenticate` for a
//!   bearer token (JSON body) and a CSRF token (`X-CSRF-TOKEN` header).
//!
//! Sessions are never refreshed; an expired token surfaces as a 401 from
//! whichever call runs into it.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::Credential;
use crate::error::{HubError, Result};
use crate::media::MediaType;

/// Login form endpoint for password authentication.
pub const LOGIN_PATH: &str = "j_spring_security_check";

/// Token exchange endpoint for API-token authentication.
pub const TOKEN_PATH: &str = "api/tokens/authenticate";

/// Server version endpoint, checked right after authenticating.
pub const VERSION_PATH: &str = "api/current-version";

/// Response header carrying the CSRF token in API-token mode.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

const BEARER_COOKIE: &str = "AUTHORIZATION_BEARER";

/// Oldest release line (leading version component) this client talks to.
pub const MIN_SERVER_RELEASE: u32 = 2018;

/// Tokens obtained from a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    bearer_token: String,
    csrf_token: Option<String>,
    cookie: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("csrf", &self.csrf_token.is_some())
            .field("cookie", &self.cookie.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from tokens obtained elsewhere.
    pub fn new(bearer_token: String, csrf_token: Option<String>, cookie: Option<String>) -> Self {
        Self {
            bearer_token,
            csrf_token,
            cookie,
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Headers that authenticate a request with this session.
    ///
    /// Always `Authorization: Bearer ...`; `X-CSRF-TOKEN` and `Cookie` only
    /// when the login flow produced them.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidCredentials`] if a token contains bytes
    /// that cannot appear in a header.
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.bearer_token))?,
        );
        if let Some(csrf) = &self.csrf_token {
            headers.insert(CSRF_HEADER, header_value(csrf)?);
        }
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, header_value(cookie)?);
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| HubError::InvalidCredentials("token is not a valid header value".to_string()))
}

/// Body of a successful token exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    bearer_token: Option<String>,
    #[serde(default)]
    expires_in_milliseconds: Option<u64>,
}

/// Log in with `credential` and return the resulting session.
///
/// # Errors
///
/// - [`HubError::Unreachable`] if the server cannot be contacted;
/// - [`HubError::InvalidCredentials`] if the server refuses the credentials
///   or its answer carries no token;
/// - [`HubError::ApiError`] for any other error status from the login endpoint.
#[tracing::instrument(skip(http, credential), fields(mode = credential.mode()))]
pub async fn authenticate(http: &Client, base_url: &Url, credential: &Credential) -> Result<Session> {
    match credential {
        Credential::Password { username, password } => {
            password_login(http, base_url, username, password).await
        }
        Credential::ApiToken { api_token } => token_exchange(http, base_url, api_token).await,
    }
}

async fn password_login(
    http: &Client,
    base_url: &Url,
    username: &str,
    password: &str,
) -> Result<Session> {
    let url = base_url.join(LOGIN_PATH)?;
    let response = http
        .post(url.clone())
        .form(&[("j_username", username), ("j_password", password)])
        .send()
        .await
        .map_err(|e| transport_error(&url, e))?;

    reject_status(response.status())?;

    let token = bearer_from_cookies(response.headers()).ok_or_else(|| {
        HubError::InvalidCredentials(format!(
            "login response carried no {BEARER_COOKIE} cookie"
        ))
    })?;

    tracing::debug!("Password login succeeded");
    let cookie = format!("{BEARER_COOKIE}={token}");
    Ok(Session::new(token, None, Some(cookie)))
}

async fn token_exchange(http: &Client, base_url: &Url, api_token: &str) -> Result<Session> {
    let url = base_url.join(TOKEN_PATH)?;
    let response = http
        .post(url.clone())
        .header(AUTHORIZATION, header_value(&format!("token {api_token}"))?)
        .header(ACCEPT, MediaType::User.as_str())
        .send()
        .await
        .map_err(|e| transport_error(&url, e))?;

    reject_status(response.status())?;

    let csrf = response
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body: TokenResponse = response.json().await.map_err(|e| {
        HubError::InvalidCredentials(format!("token exchange returned an unreadable body: {e}"))
    })?;

    let token = body
        .bearer_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            HubError::InvalidCredentials("token exchange returned no bearer token".to_string())
        })?;

    tracing::debug!(
        expires_in_ms = body.expires_in_milliseconds,
        csrf = csrf.is_some(),
        "API token exchange succeeded"
    );
    Ok(Session::new(token, csrf, None))
}

/// Fetch the server version and make sure this client supports it.
///
/// # Errors
///
/// Returns [`HubError::InvalidCredentials`] if the session is refused.
/// Anything else short of a readable version at or above
/// [`MIN_SERVER_RELEASE`] is [`HubError::UnsupportedVersion`].
#[tracing::instrument(skip(http, session))]
pub async fn check_server_version(http: &Client, base_url: &Url, session: &Session) -> Result<String> {
    let url = base_url.join(VERSION_PATH)?;
    let response = http
        .get(url.clone())
        .headers(session.auth_headers()?)
        .header(ACCEPT, MediaType::Admin.as_str())
        .send()
        .await
        .map_err(|e| transport_error(&url, e))?;

    let status = response.status();
    if is_refused(status) {
        return Err(HubError::InvalidCredentials(format!(
            "server answered {status} to the version check"
        )));
    }
    if status != StatusCode::OK {
        return Err(HubError::UnsupportedVersion(format!("status {status} from {url}")));
    }

    let bytes = response.bytes().await?;
    let version = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|body| body.get("version")?.as_str().map(str::to_string))
        .ok_or_else(|| HubError::UnsupportedVersion(format!("no version reported by {url}")))?;

    if !is_supported_version(&version) {
        return Err(HubError::UnsupportedVersion(version));
    }
    tracing::debug!(%version, "Server version supported");
    Ok(version)
}

/// True when the leading component of `version` is at least [`MIN_SERVER_RELEASE`].
pub fn is_supported_version(version: &str) -> bool {
    version
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u32>().ok())
        .is_some_and(|major| major >= MIN_SERVER_RELEASE)
}

fn is_refused(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Classify a login response status. Refusals are credential failures; any
/// other error status is reported with its code.
fn reject_status(status: StatusCode) -> Result<()> {
    if is_refused(status) {
        return Err(HubError::InvalidCredentials(format!(
            "server answered {status}"
        )));
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(HubError::ApiError {
            message: format!("login failed with {status}"),
            status_code: status.as_u16(),
        });
    }
    Ok(())
}

fn transport_error(url: &Url, err: reqwest::Error) -> HubError {
    if err.is_connect() || err.is_timeout() {
        HubError::Unreachable {
            url: url.to_string(),
            source: err,
        }
    } else {
        HubError::HttpError(err)
    }
}

/// Extract the bearer token from `Set-Cookie` headers.
fn bearer_from_cookies(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{BEARER_COOKIE}=");
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .find_map(|part| part.strip_prefix(prefix.as_str()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_from_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("JSESSIONID=xyz; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("AUTHORIZATION_BEARER=abc.def.ghi; Path=/; secure; HttpOnly"),
        );
        assert_eq!(bearer_from_cookies(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_cookie_absent() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("JSESSIONID=xyz; Path=/"));
        assert_eq!(bearer_from_cookies(&headers), None);

        let mut empty = HeaderMap::new();
        empty.append(SET_COOKIE, HeaderValue::from_static("AUTHORIZATION_BEARER=; Path=/"));
        assert_eq!(bearer_from_cookies(&empty), None);
    }

    #[test]
    fn test_auth_headers_by_mode() {
        let token_session = Session::new("bearer-1".into(), Some("csrf-1".into()), None);
        let headers = token_session.auth_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer bearer-1");
        assert_eq!(headers[CSRF_HEADER], "csrf-1");
        assert!(headers.get(COOKIE).is_none());

        let password_session = Session::new(
            "bearer-2".into(),
            None,
            Some("AUTHORIZATION_BEARER=bearer-2".into()),
        );
        let headers = password_session.auth_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer bearer-2");
        assert!(headers.get(CSRF_HEADER).is_none());
        assert_eq!(headers[COOKIE], "AUTHORIZATION_BEARER=bearer-2");
    }

    #[test]
    fn test_supported_versions() {
        assert!(is_supported_version("2023.10.1"));
        assert!(is_supported_version("2018.12.0"));
        assert!(!is_supported_version("4.8.2"));
        assert!(!is_supported_version("garbage"));
        assert!(!is_supported_version(""));
    }

    #[test]
    fn test_session_debug_hides_tokens() {
        let session = Session::new("secret-bearer".into(), Some("secret-csrf".into()), None);
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-bearer"));
        assert!(!debug.contains("secret-csrf"));
    }
}
