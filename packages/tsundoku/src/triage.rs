//! The add and shelf workflows.
//!
//! `Triage` wires fetcher, extractor and store together. Every stage failure
//! is caught here and becomes a distinct outcome; nothing is retried and a
//! record is stored only when fetching and extraction both succeeded.

use std::sync::Arc;

use llm_client::truncate_chars;
use tracing::{info, warn};

use crate::error::{ExtractError, FetchError, StoreError};
use crate::extractor::Extractor;
use crate::fetcher::TextFetcher;
use crate::record::ArticleRecord;
use crate::store::{RecordStore, FIRST_RECORD_ROW};

/// Longest provider error detail shown to the user.
const UPSTREAM_DETAIL_CHARS: usize = 80;

/// Result of one "add" run.
#[derive(Debug)]
pub enum AddOutcome {
    Saved(ArticleRecord),
    EmptyUrl,
    FetchFailed(FetchError),
    ExtractFailed(ExtractError),
    StoreFailed(StoreError),
}

impl AddOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AddOutcome::Saved(_))
    }

    /// What to tell the user.
    pub fn message(&self) -> String {
        match self {
            AddOutcome::Saved(record) => format!("Saved \"{}\" to your shelf!", record.title),
            AddOutcome::EmptyUrl => "Please enter a URL first.".to_string(),
            AddOutcome::FetchFailed(FetchError::InvalidUrl { url }) => {
                format!("\"{}\" doesn't look like a web address (http/https).", url)
            }
            AddOutcome::FetchFailed(FetchError::NoContent) => {
                "Couldn't find any article text on that page.".to_string()
            }
            AddOutcome::FetchFailed(e) => {
                format!("Couldn't read the article ({}). Check the URL and try again.", e)
            }
            AddOutcome::ExtractFailed(ExtractError::Unreachable(_)) => {
                "Couldn't reach the AI service. Check your connection and try again.".to_string()
            }
            AddOutcome::ExtractFailed(ExtractError::Upstream(e)) => {
                format!("The AI service returned an error: {}", short_detail(e))
            }
            AddOutcome::ExtractFailed(ExtractError::NotDecodable(_)) => {
                "The AI's answer couldn't be understood. Trying again may help.".to_string()
            }
            AddOutcome::ExtractFailed(ExtractError::MissingField { field }) => {
                format!("The AI's answer was missing the \"{}\". Trying again may help.", field)
            }
            AddOutcome::StoreFailed(e) => {
                format!("Couldn't save to your shelf ({}). Please add it again.", e)
            }
        }
    }
}

/// Provider error detail on one line, cut to `UPSTREAM_DETAIL_CHARS`.
///
/// Api errors read `HTTP <status>: <body>`, so the status survives the cut.
fn short_detail(detail: &str) -> String {
    let flat = detail.split_whitespace().collect::<Vec<_>>().join(" ");
    let shortened = truncate_chars(&flat, UPSTREAM_DETAIL_CHARS);
    if shortened.len() < flat.len() {
        format!("{}…", shortened)
    } else {
        flat
    }
}

/// A record as displayed, with the row it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listed {
    pub position: usize,
    pub record: ArticleRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted; carries the row it was found at.
    Deleted { position: usize },
    /// Already gone from the store.
    Vanished,
}

pub struct Triage {
    fetcher: Arc<dyn TextFetcher>,
    extractor: Extractor,
    store: Arc<dyn RecordStore>,
}

impl Triage {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        extractor: Extractor,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
        }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Fetch, summarize and shelve one article.
    pub async fn add(&self, url: &str) -> AddOutcome {
        let url = url.trim();
        if url.is_empty() {
            return AddOutcome::EmptyUrl;
        }

        let article = match self.fetcher.fetch(url).await {
            Ok(article) => article,
            Err(e) => {
                warn!(url = %url, fetcher = self.fetcher.name(), error = %e, "Fetch failed");
                return AddOutcome::FetchFailed(e);
            }
        };

        let summary = match self.extractor.extract(&article.text).await {
            Ok(summary) => summary,
            Err(e) => return AddOutcome::ExtractFailed(e),
        };

        let record = ArticleRecord::new(summary, url);
        if let Err(e) = self.store.insert(&record).await {
            warn!(url = %url, store = self.store.name(), error = %e, "Insert failed");
            return AddOutcome::StoreFailed(e);
        }

        info!(url = %url, title = %record.title, "Shelved article");
        AddOutcome::Saved(record)
    }

    /// The shelf, newest first, each record tagged with its row.
    pub async fn list(&self) -> Result<Vec<Listed>, StoreError> {
        let records = self.store.read_all().await?;
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Listed {
                position: FIRST_RECORD_ROW + index,
                record,
            })
            .collect())
    }

    /// Delete a displayed record.
    ///
    /// The row is looked up again in a fresh read, since earlier deletes may
    /// have shifted it. An equal record at the displayed row wins over one
    /// elsewhere.
    pub async fn delete(&self, listed: &Listed) -> Result<DeleteOutcome, StoreError> {
        let current = self.list().await?;

        let position = current
            .iter()
            .find(|l| l.position == listed.position && l.record == listed.record)
            .or_else(|| current.iter().find(|l| l.record == listed.record))
            .map(|l| l.position);

        let Some(position) = position else {
            info!(title = %listed.record.title, "Record already gone");
            return Ok(DeleteOutcome::Vanished);
        };

        self.store.delete_at(position).await?;
        info!(position, title = %listed.record.title, "Deleted record");
        Ok(DeleteOutcome::Deleted { position })
    }

    /// Delete every record; returns how many there were.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let count = self.store.read_all().await?.len();
        self.store.delete_range(FIRST_RECORD_ROW, count).await?;
        info!(count, "Cleared shelf");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: "A".into(),
            url: "https://example.com/a".into(),
            summary: "S".into(),
            point: "P".into(),
            action: "Act".into(),
        }
    }

    #[test]
    fn test_messages_are_distinct() {
        let outcomes = [
            AddOutcome::Saved(record()),
            AddOutcome::EmptyUrl,
            AddOutcome::FetchFailed(FetchError::NoContent),
            AddOutcome::FetchFailed(FetchError::Status { status: 404 }),
            AddOutcome::ExtractFailed(ExtractError::Unreachable("down".into())),
            AddOutcome::ExtractFailed(ExtractError::Upstream("429".into())),
            AddOutcome::ExtractFailed(ExtractError::NotDecodable("eof".into())),
            AddOutcome::ExtractFailed(ExtractError::MissingField { field: "action" }),
            AddOutcome::StoreFailed(StoreError::Backend("quota".into())),
        ];

        let messages: Vec<String> = outcomes.iter().map(AddOutcome::message).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[7].contains("action"));
    }

    #[test]
    fn test_upstream_message_keeps_status_and_drops_long_body() {
        let body = format!(
            "{{\n  \"error\": {{\n    \"code\": 429,\n    \"message\": \"{}\"\n  }}\n}}",
            "quota exceeded ".repeat(40)
        );
        let detail = format!("HTTP 429 Too Many Requests: {}", body);
        let message = AddOutcome::ExtractFailed(ExtractError::Upstream(detail)).message();

        assert!(message.contains("HTTP 429 Too Many Requests"));
        assert!(!message.contains('\n'));
        assert!(message.ends_with('…'));
        assert!(message.chars().count() < 150);

        let short = AddOutcome::ExtractFailed(ExtractError::Upstream("HTTP 401: bad key".into()));
        assert!(short.message().ends_with("HTTP 401: bad key"));
    }

    #[test]
    fn test_only_saved_is_success() {
        assert!(AddOutcome::Saved(record()).is_success());
        assert!(!AddOutcome::EmptyUrl.is_success());
        assert!(!AddOutcome::StoreFailed(StoreError::Backend("x".into())).is_success());
    }
}
