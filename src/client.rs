//! Hub API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on entity types.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::{self, Session};
use crate::config::ConnectionConfig;
use crate::error::{HubError, Result};
use crate::links::Resource;
use crate::media::MediaType;
use crate::params::QueryParams;

const USER_AGENT: &str = concat!("hubapi/", env!("CARGO_PKG_VERSION"));

/// Options controlling [`HubClient::connect_with`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Persist the connection config after a successful login.
    pub write_config: bool,
    /// Where to persist it.
    pub config_path: PathBuf,
    /// Query the server version and refuse unsupported servers.
    pub check_version: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            write_config: true,
            config_path: ConnectionConfig::default_path(),
            check_version: true,
        }
    }
}

/// Request body for [`HubClient::execute`].
#[derive(Debug, Clone)]
pub enum Body {
    /// Serialized with the endpoint's media type as `Content-Type`.
    Json(serde_json::Value),
    /// Sent as-is, e.g. scan uploads.
    Bytes(Vec<u8>),
}

/// Low-level hub API client.
///
/// Holds the authenticated session and issues HTTP requests. Entity-specific
/// operations are implemented via the `Get`, `List`, `Create`, `Update` and
/// `Delete` traits on model types.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// session.
///
/// # Example
///
/// ```no_run
/// use hubapi::{ConnectionConfig, HubClient};
///
/// # async fn example() -> hubapi::Result<()> {
/// let config = ConnectionConfig::load(".restconfig.json")?;
/// let client = HubClient::connect(&config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HubClient {
    http: Client,
    base_url: Arc<Url>,
    session: Arc<Session>,
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HubClient {
    /// Log in with `config` and persist it to `.restconfig.json`.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the login fails, the server is
    /// unreachable, or its version is unsupported.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        Self::connect_with(config, &ConnectOptions::default()).await
    }

    /// Log in with `config`, with explicit control over side effects.
    ///
    /// # Errors
    ///
    /// Same as [`HubClient::connect`].
    #[tracing::instrument(skip(config, options), fields(baseurl = %config.baseurl))]
    pub async fn connect_with(config: &ConnectionConfig, options: &ConnectOptions) -> Result<Self> {
        let base_url = Self::parse_base_url(&config.baseurl)?;
        let http = Self::build_http(config.insecure)?;

        let session = auth::authenticate(&http, &base_url, &config.credential).await?;
        if options.check_version {
            auth::check_server_version(&http, &base_url, &session).await?;
        }

        if options.write_config {
            if let Err(e) = config.save(&options.config_path) {
                tracing::warn!("Could not persist configuration: {e}");
            }
        }

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            session: Arc::new(session),
        })
    }

    /// Create a client around an existing session, without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_session(base_url: &str, session: Session, insecure: bool) -> Result<Self> {
        Ok(Self {
            http: Self::build_http(insecure)?,
            base_url: Arc::new(Self::parse_base_url(base_url)?),
            session: Arc::new(session),
        })
    }

    fn parse_base_url(base_url: &str) -> Result<Url> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Url::parse(&base_url_str)?)
    }

    fn build_http(insecure: bool) -> Result<Client> {
        if insecure {
            tracing::debug!("TLS certificate verification disabled");
        }
        Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(HubError::HttpError)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The authenticated session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve an absolute href or a path relative to the base URL.
    pub fn url(&self, target: &str) -> Result<Url> {
        if target.starts_with("http://") || target.starts_with("https://") {
            Ok(Url::parse(target)?)
        } else {
            Ok(self.base_url.join(target.trim_start_matches('/'))?)
        }
    }

    /// True when `url` points at the same scheme, host and port as the base URL.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    /// Headers for a request to `url`: media-type defaults, then caller
    /// overrides, then the session's auth headers.
    ///
    /// Auth headers are only attached when `url` shares the base URL's origin.
    ///
    /// # Errors
    ///
    /// Returns an error if a session token is not a valid header value.
    pub fn headers(
        &self,
        url: &Url,
        media: MediaType,
        overrides: Option<&HeaderMap>,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_static(media.as_str());
        headers.insert(ACCEPT, value.clone());
        headers.insert(CONTENT_TYPE, value);

        if let Some(overrides) = overrides {
            for (name, value) in overrides {
                headers.insert(name.clone(), value.clone());
            }
        }

        if self.is_same_origin(url) {
            headers.extend(self.session.auth_headers()?);
        } else {
            tracing::debug!(%url, "Foreign origin, sending request without credentials");
        }
        Ok(headers)
    }

    /// Issue a request and return the response untouched.
    ///
    /// Non-success statuses are not errors here; only transport failures are.
    #[tracing::instrument(skip(self, body, overrides), fields(media = %media))]
    pub async fn execute(
        &self,
        method: Method,
        target: &str,
        media: MediaType,
        body: Option<Body>,
        overrides: Option<&HeaderMap>,
    ) -> Result<Response> {
        let url = self.url(target)?;
        let headers = self.headers(&url, media, overrides)?;
        tracing::debug!("{method} {url}");

        let mut request = self.http.request(method, url).headers(headers);
        request = match body {
            Some(Body::Json(value)) => request.body(serde_json::to_vec(&value)?),
            Some(Body::Bytes(bytes)) => request.body(bytes),
            None => request,
        };

        let response = request.send().await.map_err(HubError::HttpError)?;
        tracing::debug!(status = response.status().as_u16(), "response");
        Ok(response)
    }

    /// Make a GET request.
    pub async fn get(&self, target: &str, media: MediaType) -> Result<Response> {
        self.execute(Method::GET, target, media, None, None).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query(
        &self,
        target: &str,
        query: &QueryParams,
        media: MediaType,
    ) -> Result<Response> {
        let mut url = self.url(target)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        self.execute(Method::GET, url.as_str(), media, None, None).await
    }

    /// Make a POST request with JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
        media: MediaType,
    ) -> Result<Response> {
        let body = Body::Json(serde_json::to_value(body)?);
        self.execute(Method::POST, target, media, Some(body), None).await
    }

    /// Make a PUT request with JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
        media: MediaType,
    ) -> Result<Response> {
        let body = Body::Json(serde_json::to_value(body)?);
        self.execute(Method::PUT, target, media, Some(body), None).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, target: &str) -> Result<Response> {
        self.execute(Method::DELETE, target, MediaType::Json, None, None)
            .await
    }

    /// GET a resource and deserialize it, failing on non-success statuses.
    pub async fn get_json<T: DeserializeOwned>(&self, target: &str, media: MediaType) -> Result<T> {
        let response = Self::check_response(self.get(target, media).await?).await?;
        Self::read_json(response).await
    }

    /// Follow the `rel` link of `resource` and deserialize the target.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MissingLink`] if the resource has no such link.
    pub async fn follow<T, R>(&self, resource: &R, rel: &str, media: MediaType) -> Result<T>
    where
        T: DeserializeOwned,
        R: Resource + ?Sized,
    {
        let href = resource.require_link(rel)?;
        self.get_json(href, media).await
    }

    /// POST a create request and return the new resource's `Location`.
    ///
    /// Any status other than 201 is returned as [`HubError::ApiError`] with
    /// the server's status code intact.
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
        media: MediaType,
    ) -> Result<String> {
        let response = self.post(target, body, media).await?;
        if response.status() != StatusCode::CREATED {
            return Err(Self::api_error(response).await);
        }
        Self::location(&response)
    }

    /// PUT a full representation, failing on non-success statuses.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
        media: MediaType,
    ) -> Result<()> {
        Self::check_response(self.put(target, body, media).await?).await?;
        Ok(())
    }

    /// DELETE a resource, failing on non-success statuses.
    pub async fn delete_resource(&self, target: &str) -> Result<()> {
        Self::check_response(self.delete(target).await?).await?;
        Ok(())
    }

    /// Upload a file body with the given media type.
    pub async fn post_bytes(&self, target: &str, bytes: Vec<u8>, media: MediaType) -> Result<Response> {
        self.execute(Method::POST, target, media, Some(Body::Bytes(bytes)), None)
            .await
    }

    /// The server's version string.
    pub async fn server_version(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct CurrentVersion {
            version: String,
        }
        let current: CurrentVersion = self.get_json(auth::VERSION_PATH, MediaType::Admin).await?;
        Ok(current.version)
    }

    /// `Location` header of a response.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MissingLocation`] if the header is absent.
    pub fn location(response: &Response) -> Result<String> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(HubError::MissingLocation)
    }

    /// Deserialize a response body.
    ///
    /// A body that is not the expected JSON is a [`HubError::ParseError`],
    /// not a transport error.
    pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check response status and convert errors.
    pub async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::api_error(response).await)
    }

    async fn api_error(response: Response) -> HubError {
        let status = response.status();

        // Handle rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return HubError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        let message = Self::extract_error_message(response, status).await;
        HubError::ApiError {
            message,
            status_code: status.as_u16(),
        }
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) if !b.is_empty() => b,
            _ => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            for key in ["errorMessage", "message", "error"] {
                if let Some(msg) = json.get(key).and_then(|m| m.as_str()) {
                    return msg.to_string();
                }
            }
        }

        body
    }
}
