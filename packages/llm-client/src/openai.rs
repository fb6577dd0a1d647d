//! OpenAI-compatible chat completions backend.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::schema::StructuredSchema;
use crate::types::{ChatRequest, ChatResponseRaw, GenerationRequest};
use crate::TextGenerator;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Client for `/chat/completions` on OpenAI or any compatible server.
pub struct OpenAiClient {
    http_client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    schema_support: bool,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            schema_support: true,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (Azure, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Declare whether the server honours `response_format: json_schema`.
    pub fn with_schema_support(mut self, supported: bool) -> Self {
        self.schema_support = supported;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                LlmError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let chat_response: ChatResponseRaw = response
            .json()
            .await?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            total_tokens = chat_response.usage.as_ref().map(|u| u.total_tokens),
            "OpenAI chat completion"
        );

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Refused("no choices returned".into()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(LlmError::Refused(refusal));
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(LlmError::Refused(format!(
                "empty content (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ))),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String> {
        let chat = ChatRequest::from_generation(&self.model, request);
        self.send(&chat).await
    }

    async fn generate_json(
        &self,
        request: &GenerationRequest,
        schema: &StructuredSchema,
    ) -> Result<String> {
        let chat = ChatRequest::from_generation(&self.model, request)
            .with_json_schema(&schema.name, schema.openai.clone());
        self.send(&chat).await
    }

    fn supports_schema(&self) -> bool {
        self.schema_support
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
