//! Error types for the generation client.

use thiserror::Error;

/// Result type for generation client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Generation client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, quota, invalid request)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (response envelope did not match the provider's format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model answered but produced no usable content (blocked, empty, refused)
    #[error("Generation refused: {0}")]
    Refused(String),
}

impl LlmError {
    /// Whether the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LlmError::Network(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::Parse(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}
