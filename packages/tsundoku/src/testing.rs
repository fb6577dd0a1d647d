//! Testing utilities including mock implementations.
//!
//! Call-recording doubles for the fetcher and the generator, so the whole
//! add/list/delete workflow can run without network access. Pair them with
//! [`MemoryStore`](crate::store::MemoryStore).

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use llm_client::{GenerationRequest, LlmError, StructuredSchema, TextGenerator};

use crate::error::FetchError;
use crate::fetcher::{FetchedArticle, TextFetcher};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A mock fetcher serving predefined pages.
///
/// Unknown URLs fail with `Status { status: 404 }`.
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, FetchError>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `url`.
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        lock(&self.pages).insert(url.into(), text.into());
        self
    }

    /// Fail every fetch of `url` with `error`.
    pub fn with_failure(self, url: impl Into<String>, error: FetchError) -> Self {
        lock(&self.failures).insert(url.into(), error);
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl TextFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
        lock(&self.calls).push(url.to_string());

        if let Some(error) = lock(&self.failures).get(url) {
            return Err(error.clone());
        }

        lock(&self.pages)
            .get(url)
            .map(|text| FetchedArticle {
                url: url.to_string(),
                title: None,
                text: text.clone(),
            })
            .ok_or(FetchError::Status { status: 404 })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub enum MockGeneratorCall {
    Text { prompt: String },
    Json { schema_name: String, prompt: String },
}

impl MockGeneratorCall {
    pub fn prompt(&self) -> &str {
        match self {
            MockGeneratorCall::Text { prompt } | MockGeneratorCall::Json { prompt, .. } => prompt,
        }
    }
}

/// A mock generator returning canned replies.
///
/// Queued errors are returned first, one per call; after that every call gets
/// the default reply. Both generation modes return the same text.
pub struct MockGenerator {
    reply: Mutex<String>,
    errors: Mutex<VecDeque<LlmError>>,
    schema_support: bool,
    calls: Mutex<Vec<MockGeneratorCall>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            reply: Mutex::new(String::new()),
            errors: Mutex::new(VecDeque::new()),
            schema_support: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` to every call.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        *lock(&self.reply) = reply.into();
        self
    }

    /// Fail the next call with `error`.
    pub fn with_error(self, error: LlmError) -> Self {
        lock(&self.errors).push_back(error);
        self
    }

    /// Report no schema enforcement, like a plain-text backend.
    pub fn without_schema_support(mut self) -> Self {
        self.schema_support = false;
        self
    }

    /// Change the reply for later calls.
    pub fn set_reply(&self, reply: impl Into<String>) {
        *lock(&self.reply) = reply.into();
    }

    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        lock(&self.calls).clone()
    }

    fn respond(&self, call: MockGeneratorCall) -> llm_client::Result<String> {
        lock(&self.calls).push(call);
        match lock(&self.errors).pop_front() {
            Some(error) => Err(error),
            None => Ok(lock(&self.reply).clone()),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> llm_client::Result<String> {
        self.respond(MockGeneratorCall::Text {
            prompt: request.prompt.clone(),
        })
    }

    async fn generate_json(
        &self,
        request: &GenerationRequest,
        schema: &StructuredSchema,
    ) -> llm_client::Result<String> {
        self.respond(MockGeneratorCall::Json {
            schema_name: schema.name.clone(),
            prompt: request.prompt.clone(),
        })
    }

    fn supports_schema(&self) -> bool {
        self.schema_support
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
