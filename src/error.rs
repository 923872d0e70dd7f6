//! Error types shared by the credential loader and the API client.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Boxed error coming out of a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for blitz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for credential loading and API calls.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials file (or the home directory holding it) could not be read.
    #[error("unable to read credentials file {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials file is not a valid credentials document.
    #[error("unable to parse credentials file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Request body could not be encoded.
    #[error("error marshaling body")]
    Serialization(#[source] serde_json::Error),

    /// The HTTP request could not be made.
    #[error("error making api request")]
    Network(#[source] BoxError),

    /// The response body could not be read.
    #[error("error reading response")]
    Io(#[source] BoxError),

    /// The service answered with a status other than the expected one.
    #[error("unexpected response: {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// Response body did not match the expected shape.
    #[error("error unmarshalling response")]
    Deserialization(#[source] serde_json::Error),

    /// A time bound could not be parsed.
    #[error("invalid time {input:?}: {reason}")]
    InvalidTime { input: String, reason: String },

    /// Start of a time range lies after its end.
    #[error("invalid time range: start {start_ms} is after end {end_ms}")]
    InvalidRange { start_ms: i64, end_ms: i64 },
}

impl Error {
    /// Returns the HTTP status for `UnexpectedStatus` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service rejected the auth token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}
