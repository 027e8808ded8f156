//! Error handling for requests

use thiserror::Error;

/// Errors recorded while a request is being configured.
///
/// These land in the builder's sticky error slot and are only surfaced when a
/// terminal verb runs. The first one recorded wins until
/// [`RequestBuilder::clear_error`](crate::http::RequestBuilder::clear_error).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed URL '{input}': {source}")]
    MalformedUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No URL has been set")]
    NoUrl,

    #[error("Payload encoding error: {0}")]
    PayloadEncoding(String),

    #[error("Invalid proxy '{input}': {reason}")]
    InvalidProxy { input: String, reason: String },
}

/// Errors raised while turning a raw response body into something usable
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("gzip decompression failed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for requests operations
#[derive(Error, Debug)]
pub enum RequestsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response body unavailable: {0}")]
    Unavailable(String),
}

impl RequestsError {
    /// Returns the configuration error, if that is what this is
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            RequestsError::Config(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for requests operations
pub type Result<T> = std::result::Result<T, RequestsError>;
