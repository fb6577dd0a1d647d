//! Tsundoku Mate: a personal read-it-later shelf.
//!
//! Hand it a URL and it fetches the article, asks an LLM for a short
//! structured summary (title, summary, key point, next action) and keeps the
//! result as a row on a spreadsheet shelf, newest first.
//!
//! # Architecture
//!
//! ```text
//! URL ─► TextFetcher ─► Extractor ─► RecordStore
//!         (HTTP)        (LLM)        (Sheets / memory)
//! ```
//!
//! [`Triage`] sequences the three and turns each stage's failure into an
//! [`AddOutcome`]. Nothing is retried automatically.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tsundoku::{Extractor, ExtractorConfig, HttpFetcher, MemoryStore, Triage};
//!
//! let generator = Arc::new(llm_client::GeminiClient::from_env()?);
//! let triage = Triage::new(
//!     Arc::new(HttpFetcher::new()?),
//!     Extractor::new(generator, ExtractorConfig::default()),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let outcome = triage.add("https://example.com/post").await;
//! println!("{}", outcome.message());
//! ```
//!
//! # Modules
//!
//! - [`fetcher`] - URL to article text
//! - [`extractor`] - Article text to a validated summary
//! - [`store`] - Ordered record storage
//! - [`triage`] - The add and shelf workflows
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod record;
pub mod shell;
pub mod store;
pub mod testing;
pub mod triage;

pub use config::{Config, StoreKind};
pub use error::{ExtractError, FetchError, StoreError};
pub use extractor::{Extractor, ExtractorConfig, Strategy};
pub use fetcher::{FetchedArticle, HttpFetcher, TextFetcher};
pub use record::{ArticleRecord, ArticleSummary};
pub use store::{MemoryStore, RecordStore, SheetsStore, HEADER_ROWS};
pub use triage::{AddOutcome, DeleteOutcome, Listed, Triage};
