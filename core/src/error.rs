//! Error types for the BAILO API client.
//!
//! # Design
//! `Unauthorized` gets a dedicated variant because callers routinely need to
//! tell "the server refused these credentials" apart from every other
//! failure, and the server usually explains why in a JSON body. Any other
//! non-2xx response whose body is not JSON lands in `Status` with the raw
//! status code, reason phrase and body text. Transport failures keep the
//! underlying ureq error as their source so nothing is lost on the way to
//! the caller.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `BailoApi` and its collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401 with a JSON body describing the refusal.
    #[error("unauthorized: {payload}")]
    Unauthorized { payload: serde_json::Value },

    /// The server returned a non-2xx status and the body was not JSON.
    #[error("HTTP {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    /// A 2xx response body could not be parsed as JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The downloaded body is not a readable ZIP archive.
    #[error("archive extraction failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout, DNS, connection or TLS handshake failure.
    #[error("transport error: {0}")]
    Transport(#[source] Box<ureq::Error>),

    /// The client certificate bundle or TLS connector could not be set up.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Required configuration or credentials are missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
