//! Error types for hub API operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during hub API operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// Configuration is missing or incomplete.
    #[error("hub configuration required: {0}")]
    ConfigMissing(String),

    /// The configuration file could not be read or written.
    #[error("failed to access configuration file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the supplied credentials, or answered without a token.
    #[error("authentication failed: {0}")]
    InvalidCredentials(String),

    /// The server could not be reached at all.
    #[error("unable to reach hub server at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server reports a version this client does not support.
    #[error("unsupported hub server version '{0}'")]
    UnsupportedVersion(String),

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// API request failed with a non-success status.
    #[error("hub API error ({status_code}): {message}")]
    ApiError { message: String, status_code: u16 },

    /// A resource did not carry the expected hypermedia link.
    #[error("resource has no '{rel}' link")]
    MissingLink { rel: String },

    /// A create request succeeded without a `Location` header.
    #[error("response did not include a Location header")]
    MissingLocation,

    /// The server finished a report job unsuccessfully.
    #[error("report at {location} finished with status {status}")]
    ReportFailed { location: String, status: String },

    /// Polling gave up before the server reported completion.
    #[error("gave up after {attempts} polling attempts")]
    Timeout { attempts: u32 },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A scan upload was given a file the server cannot ingest.
    #[error("cannot upload {}: expected a .jsonld or .bdio file", path.display())]
    UnsupportedScanFile { path: PathBuf },

    /// Local I/O error (report output, scan upload input).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl HubError {
    /// HTTP status carried by this error, if the server answered at all.
    ///
    /// Lets callers branch on specific codes (for example 412 when a project
    /// name is already taken) without matching on messages.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HubError::ApiError { status_code, .. } => Some(*status_code),
            HubError::RateLimited { .. } => Some(429),
            HubError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server refused a create because the entity already exists.
    #[must_use]
    pub fn is_precondition_failed(&self) -> bool {
        self.status_code() == Some(412)
    }
}

/// Result type alias for hub operations.
pub type Result<T> = core::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_for_api_error() {
        let err = HubError::ApiError {
            message: "exists".to_string(),
            status_code: 412,
        };
        assert_eq!(err.status_code(), Some(412));
        assert!(err.is_precondition_failed());
    }

    #[test]
    fn test_status_code_absent_for_local_errors() {
        let err = HubError::MissingLink {
            rel: "versions".to_string(),
        };
        assert_eq!(err.status_code(), None);
        assert!(!err.is_precondition_failed());
        assert_eq!(err.to_string(), "resource has no 'versions' link");
    }

    #[test]
    fn test_timeout_is_distinct_from_failure() {
        let timeout = HubError::Timeout { attempts: 3 };
        let failed = HubError::ReportFailed {
            location: "https://hub/api/reports/1".to_string(),
            status: "FAILED".to_string(),
        };
        assert!(matches!(timeout, HubError::Timeout { attempts: 3 }));
        assert!(!matches!(failed, HubError::Timeout { .. }));
    }
}
