//! Connection configuration.
//!
//! A [`ConnectionConfig`] is built once per process, either from explicit
//! arguments or from a JSON file (`.restconfig.json` by default):
//!
//! ```json
//! {
//!   "baseurl": "https://hub.example.com",
//!   "api_token": "...",
//!   "insecure": false,
//!   "debug": false
//! }
//! ```
//!
//! The credential is either a `username`/`password` pair or an `api_token`.
//! When both are present the token wins.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".restconfig.json";

/// How the client proves its identity to the server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credential {
    /// Exchanged for a bearer token at the token-authenticate endpoint.
    ApiToken { api_token: String },
    /// Posted to the login form; the bearer token comes back as a cookie.
    Password { username: String, password: String },
}

impl Credential {
    /// Short name of the authentication mode, safe to log.
    pub fn mode(&self) -> &'static str {
        match self {
            Credential::ApiToken { .. } => "api-token",
            Credential::Password { .. } => "password",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiToken { .. } => f.debug_struct("ApiToken").finish_non_exhaustive(),
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Connection settings for a hub server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server base URL, without the `/api` suffix.
    pub baseurl: String,

    #[serde(flatten)]
    pub credential: Credential,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Enable debug logging.
    #[serde(default)]
    pub debug: bool,
}

impl ConnectionConfig {
    /// Configuration authenticating with a username and password.
    pub fn with_password(baseurl: &str, username: &str, password: &str) -> Self {
        Self::new(
            baseurl,
            Credential::Password {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
    }

    /// Configuration authenticating with an API token.
    pub fn with_api_token(baseurl: &str, api_token: &str) -> Self {
        Self::new(
            baseurl,
            Credential::ApiToken {
                api_token: api_token.to_string(),
            },
        )
    }

    fn new(baseurl: &str, credential: Credential) -> Self {
        Self {
            baseurl: baseurl.trim_end_matches('/').to_string(),
            credential,
            insecure: false,
            debug: false,
        }
    }

    /// Disable TLS certificate verification.
    #[must_use]
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Enable debug logging.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Path of the configuration file in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ConfigIo`] if the file cannot be read, and
    /// [`HubError::ConfigMissing`] if it lacks a base URL or a credential.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());

        let raw = fs::read_to_string(path).map_err(|source| HubError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: ConnectionConfig = serde_json::from_str(&raw).map_err(|e| {
            HubError::ConfigMissing(format!(
                "{} must contain 'baseurl' and either 'api_token' or 'username'/'password' ({e})",
                path.display()
            ))
        })?;
        config.baseurl = config.baseurl.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Write the configuration to a JSON file, replacing any existing one.
    ///
    /// On unix the file is created readable by the owner only, since it
    /// holds credentials.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ConfigIo`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| HubError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }

        tracing::debug!("Wrote configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_password_config() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"baseurl": "https://hub.example.com", "username": "sysadmin", "password": "blackduck"}"#,
        )
        .unwrap();

        assert_eq!(config.baseurl, "https://hub.example.com");
        assert_eq!(config.credential.mode(), "password");
        assert!(!config.insecure);
        assert!(!config.debug);
    }

    #[test]
    fn test_api_token_wins_over_password() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{
                "baseurl": "https://hub.example.com",
                "username": "sysadmin",
                "password": "blackduck",
                "api_token": "abc123",
                "insecure": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.credential,
            Credential::ApiToken {
                api_token: "abc123".to_string()
            }
        );
        assert!(config.insecure);
    }

    #[test]
    fn test_missing_credential_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"baseurl": "https://hub.example.com"}"#).unwrap();

        let err = ConnectionConfig::load(&path).unwrap_err();
        assert!(matches!(err, HubError::ConfigMissing(_)));
    }

    #[test]
    fn test_missing_file_is_config_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConnectionConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, HubError::ConfigIo { .. }));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = ConnectionConfig::with_password("https://hub", "alice", "hunter2");
        let debug = format!("{:?}", config);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));

        let config = ConnectionConfig::with_api_token("https://hub", "tok-secret");
        assert!(!format!("{:?}", config).contains("tok-secret"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ConnectionConfig::with_api_token("https://hub.example.com/", "t");
        assert_eq!(config.baseurl, "https://hub.example.com");
    }
}
