//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::schema::StructuredSchema;
use crate::types::{GeminiRequest, GeminiResponseRaw, GenerationRequest};
use crate::TextGenerator;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini API.
pub struct GeminiClient {
    http_client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Create from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| LlmError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model (default: gemini-2.5-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn send(&self, request: &GeminiRequest) -> Result<String> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                LlmError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let raw: GeminiResponseRaw = response
            .json()
            .await?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini generateContent"
        );

        response_text(raw)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(raw: GeminiResponseRaw) -> Result<String> {
    if let Some(reason) = raw.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Refused(format!("prompt blocked: {}", reason)));
    }

    let candidate = raw
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Refused("no candidates returned".into()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::Refused(format!(
            "empty candidate (finish_reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String> {
        self.send(&GeminiRequest::from_generation(request)).await
    }

    async fn generate_json(
        &self,
        request: &GenerationRequest,
        schema: &StructuredSchema,
    ) -> Result<String> {
        let body = GeminiRequest::from_generation(request).with_response_schema(schema.gemini.clone());
        self.send(&body).await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
