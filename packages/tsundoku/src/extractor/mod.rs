//! Structured extraction: article text in, a validated [`ArticleSummary`] out.
//!
//! Two strategies share one validation step:
//!
//! - **Schema** (default): the backend is handed a strict JSON schema for
//!   [`ArticleSummary`] and enforces it; the reply is decoded directly and a
//!   decode failure is a backend fault.
//! - **Freeform**: the prompt embeds the expected object as example text and
//!   the reply goes through [`parse_freeform`].
//!
//! Exactly one generator call is made per `extract`. When the generator has no
//! schema enforcement, the Freeform strategy is selected up front.

mod freeform;
mod prompts;

pub use freeform::{parse_freeform, FreeformParse, RawSummary};
pub use prompts::{freeform_prompt, schema_prompt, SYSTEM_PROMPT};

use std::sync::Arc;

use llm_client::{truncate_chars, GenerationRequest, StructuredSchema, TextGenerator};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::record::ArticleSummary;

pub const DEFAULT_CHAR_BUDGET: usize = 8000;
pub const MIN_CHAR_BUDGET: usize = 1000;
pub const MAX_CHAR_BUDGET: usize = 100_000;

/// How the generator is asked for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Schema,
    Freeform,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" => Ok(Strategy::Schema),
            "freeform" | "free-form" => Ok(Strategy::Freeform),
            other => Err(format!("unknown strategy: {} (expected schema|freeform)", other)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Schema => f.write_str("schema"),
            Strategy::Freeform => f.write_str("freeform"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub strategy: Strategy,

    /// Characters of article text submitted to the generator.
    pub char_budget: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            char_budget: DEFAULT_CHAR_BUDGET,
        }
    }
}

impl ExtractorConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the budget, clamped into `MIN_CHAR_BUDGET..=MAX_CHAR_BUDGET`.
    pub fn with_char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget.clamp(MIN_CHAR_BUDGET, MAX_CHAR_BUDGET);
        self
    }
}

pub struct Extractor {
    generator: Arc<dyn TextGenerator>,
    config: ExtractorConfig,
    schema: StructuredSchema,
}

impl Extractor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ExtractorConfig) -> Self {
        Self {
            generator,
            config,
            schema: StructuredSchema::of::<ArticleSummary>(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The strategy a call will actually use with this generator.
    pub fn effective_strategy(&self) -> Strategy {
        match self.config.strategy {
            Strategy::Schema if !self.generator.supports_schema() => Strategy::Freeform,
            strategy => strategy,
        }
    }

    pub async fn extract(&self, text: &str) -> Result<ArticleSummary, ExtractError> {
        let article = truncate_chars(text, self.config.char_budget);
        let strategy = self.effective_strategy();
        let start = std::time::Instant::now();

        if strategy != self.config.strategy {
            debug!(
                backend = self.generator.name(),
                "Backend lacks schema enforcement, using freeform strategy"
            );
        }

        let raw = match strategy {
            Strategy::Schema => self.extract_with_schema(article).await,
            Strategy::Freeform => self.extract_freeform(article).await,
        }
        .inspect_err(|e| {
            warn!(
                backend = self.generator.name(),
                strategy = %strategy,
                error = %e,
                "Extraction failed"
            )
        })?;

        let summary = validate(raw).inspect_err(|e| {
            warn!(strategy = %strategy, error = %e, "Extraction incomplete")
        })?;

        info!(
            backend = self.generator.name(),
            model = self.generator.model(),
            strategy = %strategy,
            input_chars = article.chars().count(),
            truncated = article.len() < text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Extracted summary"
        );

        Ok(summary)
    }

    async fn extract_with_schema(&self, article: &str) -> Result<RawSummary, ExtractError> {
        let request = GenerationRequest::new(SYSTEM_PROMPT, schema_prompt(article));
        let json = self.generator.generate_json(&request, &self.schema).await?;

        serde_json::from_str(&json).map_err(|e| {
            ExtractError::NotDecodable(format!("schema-constrained reply did not decode: {}", e))
        })
    }

    async fn extract_freeform(&self, article: &str) -> Result<RawSummary, ExtractError> {
        let request = GenerationRequest::new(SYSTEM_PROMPT, freeform_prompt(article));
        let reply = self.generator.generate_text(&request).await?;

        match parse_freeform(&reply) {
            FreeformParse::Decoded(raw) => Ok(raw),
            FreeformParse::Undecodable => {
                debug!(reply_len = reply.len(), "Free-form reply had no decodable object");
                Err(ExtractError::NotDecodable(
                    "reply contained no decodable JSON object".to_string(),
                ))
            }
        }
    }
}

/// Trim every field; the first absent or blank one fails the whole record.
pub fn validate(raw: RawSummary) -> Result<ArticleSummary, ExtractError> {
    fn required(value: Option<String>, field: &'static str) -> Result<String, ExtractError> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ExtractError::MissingField { field }),
        }
    }

    Ok(ArticleSummary {
        title: required(raw.title, "title")?,
        summary: required(raw.summary, "summary")?,
        point: required(raw.point, "point")?,
        action: required(raw.action, "action")?,
    })
}
