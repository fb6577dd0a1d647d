//! Typed errors for each pipeline stage.
//!
//! Every collaborator failure is caught at its own boundary and turned into
//! one of these; the orchestrator maps them to user-facing messages.

use thiserror::Error;

/// Why an article's text could not be obtained.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("no readable text on the page")]
    NoContent,
}

/// Why structured extraction failed. None of these are retried.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The generation backend could not be reached.
    #[error("generator unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with an error (quota, auth, bad request).
    #[error("generator error: {0}")]
    Upstream(String),

    /// The backend answered, but its output could not be decoded.
    #[error("response not decodable: {0}")]
    NotDecodable(String),

    /// The output decoded but a required field was absent or blank.
    #[error("response missing required field `{field}`")]
    MissingField { field: &'static str },
}

impl From<llm_client::LlmError> for ExtractError {
    fn from(e: llm_client::LlmError) -> Self {
        use llm_client::LlmError;
        match e {
            LlmError::Network(msg) => ExtractError::Unreachable(msg),
            LlmError::Api(msg) | LlmError::Config(msg) => ExtractError::Upstream(msg),
            LlmError::Parse(msg) | LlmError::Refused(msg) => ExtractError::NotDecodable(msg),
        }
    }
}

/// Record store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("position {position} is outside rows {first}..={last}")]
    OutOfRange {
        position: usize,
        first: usize,
        last: usize,
    },

    #[error("sheet header {found:?} does not match the expected columns")]
    HeaderMismatch { found: Vec<String> },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sheets_client::SheetsError> for StoreError {
    fn from(e: sheets_client::SheetsError) -> Self {
        StoreError::Backend(e.to_string())
    }
}
