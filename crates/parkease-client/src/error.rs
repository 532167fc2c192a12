//! Client error types.

/// Result type for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the parkease client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The token was missing, expired or rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller lacks the admin capability.
    #[error("forbidden")]
    Forbidden,

    /// The addressed branch, record or profile does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The parking session was already paid.
    #[error("already completed: {0}")]
    AlreadyCompleted(String),

    /// The plate's balance could not cover the redemption.
    #[error("insufficient points: available={available}, requested={requested}")]
    InsufficientPoints {
        /// Balance at the time of the request.
        available: u64,
        /// Points the payment tried to redeem.
        requested: u64,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether retrying the same request could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 502 || *status == 503,
            _ => false,
        }
    }
}
