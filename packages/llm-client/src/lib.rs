//! Provider-neutral text generation client
//!
//! A small client for the two backends the read-later tool talks to:
//! OpenAI-compatible chat completions and Google Gemini. Both support a
//! free-form mode (plain text back) and a schema-constrained mode where the
//! backend enforces a JSON schema derived from a Rust type.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{GeminiClient, GenerationRequest, TextGenerator};
//!
//! let client = GeminiClient::from_env()?;
//! let text = client
//!     .generate_text(&GenerationRequest::new("Be brief.", "Hello!"))
//!     .await?;
//! ```
//!
//! Schema-constrained calls take a [`StructuredSchema`] built from any
//! `JsonSchema` type; decoding the returned JSON is left to the caller.

pub mod error;
pub mod gemini;
pub mod openai;
pub mod schema;
pub mod types;

pub use error::{LlmError, Result};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use schema::{StructuredOutput, StructuredSchema};
pub use types::{truncate_chars, GenerationRequest};

use async_trait::async_trait;

/// A text generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-form generation; returns the model's raw text.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String>;

    /// Schema-constrained generation; returns the JSON text the backend produced.
    async fn generate_json(
        &self,
        request: &GenerationRequest,
        schema: &StructuredSchema,
    ) -> Result<String>;

    /// Whether `generate_json` is backed by real schema enforcement.
    fn supports_schema(&self) -> bool {
        true
    }

    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Model identifier (for logging).
    fn model(&self) -> &str;
}

/// Which backend a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl std::str::FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(LlmError::Config(format!("unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::OpenAi => f.write_str("openai"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" OpenAI ".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("claude".parse::<Provider>().is_err());
        assert_eq!(Provider::default().to_string(), "gemini");
    }
}
