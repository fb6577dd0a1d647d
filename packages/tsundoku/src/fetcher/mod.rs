//! Article text fetching.
//!
//! A fetcher turns a URL into the article's main text. The orchestrator treats
//! any error as "no article"; the error type only feeds logs and messages.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

/// Main text of a fetched page.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    /// URL after redirects
    pub url: String,

    /// `<title>` if the page had one
    pub title: Option<String>,

    /// Extracted main text (markdown)
    pub text: String,
}

#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError>;

    fn name(&self) -> &str {
        "unknown"
    }
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl {
        url: url.to_string(),
    };

    let parsed = Url::parse(url.trim()).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(parsed),
        _ => Err(invalid()),
    }
}
