//! Error types for the client library.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the provider.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed proxy or client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No reachable path to the API host.
    #[error("Connectivity check failed: {0}")]
    Connectivity(String),

    /// Query rejected before any request was issued.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Transport failure or provider-side 5xx. Retryable.
    #[error("Transient fetch failure: {0}")]
    TransientFetch(String),

    /// Provider-reported rate limiting, with the Retry-After hint when present.
    #[error("Rate limited by provider (retry after {retry_after:?}s)")]
    RateLimit {
        /// Seconds to wait before retrying, from the Retry-After header.
        retry_after: Option<u64>,
    },

    /// Unexpected non-success HTTP status that is not worth retrying.
    #[error("Unexpected HTTP status {code}")]
    Status { code: u16 },

    /// Response did not match the expected schema.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ClientError {
    /// Whether the caller may reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::TransientFetch(_) | ClientError::RateLimit { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::TransientFetch(err.to_string())
    }
}
