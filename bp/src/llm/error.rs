//! LLM gateway errors

use std::time::Duration;
use thiserror::Error;

/// Why a completion could not be obtained
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP 429; `retry_after` comes from the `retry-after` header (60s if absent)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Any other non-success HTTP status, with the response body
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered but the body was unusable (bad JSON, no text)
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Provider, model or credentials are unusable; retrying will not help
    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether the user asking again has a chance of succeeding
    ///
    /// Client-side HTTP statuses (bad key, unknown model, ...) and
    /// configuration errors need a settings change first.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) | LlmError::Timeout(_) => true,
            LlmError::InvalidResponse(_) => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Config(_) => false,
        }
    }

    /// How long the provider asked us to wait, for rate limits
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
