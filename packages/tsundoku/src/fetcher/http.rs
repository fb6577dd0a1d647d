//! HTTP fetcher: reqwest for the page, scraper for the main content area,
//! htmd for Markdown.
//!
//! No JavaScript rendering, so script-built pages come back empty and are
//! reported as `NoContent`.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{validate_url, FetchedArticle, TextFetcher};
use crate::error::FetchError;

/// Content containers tried in order; the first match wins.
const MAIN_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".entry-content",
    "#content",
];

/// Elements stripped before conversion.
const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "script",
    "style",
    "noscript",
    "iframe",
    "form",
    ".advertisement",
    ".ads",
    ".sidebar",
    ".menu",
];

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        // Browser-like User-Agent; many blogs refuse obvious bots
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("ja,en-US;q=0.7,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch raw HTML and the final URL after redirects.
    async fn fetch_html(&self, url: &str) -> Result<(String, String), FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            FetchError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok((html, final_url))
    }

    fn extract_title(document: &Html) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// HTML of the main content area, falling back to `<body>`.
    fn extract_main_content(document: &Html) -> String {
        for selector_str in MAIN_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(main) = document.select(&selector).next() {
                    let text_len: usize = main.text().map(str::len).sum();
                    if text_len > 0 {
                        return main.html();
                    }
                }
            }
        }

        if let Ok(body_selector) = Selector::parse("body") {
            if let Some(body) = document.select(&body_selector).next() {
                return body.html();
            }
        }

        document.html()
    }

    /// Detach boilerplate subtrees from the parsed fragment and re-serialize.
    fn remove_boilerplate(html: &str) -> String {
        let mut fragment = Html::parse_fragment(html);

        let doomed: Vec<_> = BOILERPLATE_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .flat_map(|selector| {
                fragment
                    .select(&selector)
                    .map(|element| element.id())
                    .collect::<Vec<_>>()
            })
            .collect();

        for id in doomed {
            if let Some(mut node) = fragment.tree.get_mut(id) {
                node.detach();
            }
        }

        fragment.root_element().inner_html()
    }

    fn html_to_text(html: &str) -> String {
        let markdown = htmd::convert(html).unwrap_or_else(|_| {
            Html::parse_fragment(html).root_element().text().collect::<String>()
        });
        normalize_whitespace(&markdown)
    }

    /// Full pipeline on an HTML document.
    pub(crate) fn extract(html: &str) -> (Option<String>, String) {
        let document = Html::parse_document(html);
        let title = Self::extract_title(&document);
        let main = Self::extract_main_content(&document);
        let cleaned = Self::remove_boilerplate(&main);
        (title, Self::html_to_text(&cleaned))
    }
}

/// Trim line ends and collapse runs of blank lines to one.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }

    out.trim().to_string()
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
        let parsed = validate_url(url)?;
        let start = std::time::Instant::now();

        let (html, final_url) = self.fetch_html(parsed.as_str()).await?;
        let (title, text) = Self::extract(&html);

        if text.is_empty() {
            warn!(url = %final_url, html_len = html.len(), "No readable text extracted");
            return Err(FetchError::NoContent);
        }

        debug!(url = %final_url, title = ?title, "Extracted article text");
        info!(
            url = %final_url,
            text_len = text.chars().count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched article"
        );

        Ok(FetchedArticle {
            url: final_url,
            title,
            text,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title> How to Read More </title><style>body { color: red; }</style></head>
          <body>
            <nav><a href="/">Home</a> | <a href="/about">About</a></nav>
            <article>
              <h1>How to Read More</h1>
              <p>Pick one article a day.</p>
              <aside>Related: ten other posts</aside>
              <p>Write down one action.</p>
            </article>
            <footer>© 2024 Example</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extract_title() {
        let document = Html::parse_document(PAGE);
        assert_eq!(
            HttpFetcher::extract_title(&document),
            Some("How to Read More".to_string())
        );
    }

    #[test]
    fn test_extract_prefers_article() {
        let (_, text) = HttpFetcher::extract(PAGE);
        assert!(text.contains("Pick one article a day."));
        assert!(text.contains("Write down one action."));
        assert!(!text.contains("Home"));
        assert!(!text.contains("© 2024"));
        assert!(!text.contains("Related: ten other posts"));
    }

    #[test]
    fn test_extract_strips_boilerplate_with_many_attributes() {
        let html = r#"<html><body><article><p>Keep.</p><nav class="a" id="b" data-q="1" role="navigation" aria-label="x">NAV-MANY</nav><p>Also keep.</p><aside class="c" id="d" data-x="1" data-y="2" role="complementary" aria-label="side">SIDE-MANY</aside></article></body></html>"#;
        let (_, text) = HttpFetcher::extract(html);
        assert!(text.contains("Keep."));
        assert!(text.contains("Also keep."));
        assert!(!text.contains("NAV-MANY"));
        assert!(!text.contains("SIDE-MANY"));
    }

    #[test]
    fn test_nested_boilerplate_is_removed_once() {
        let cleaned = HttpFetcher::remove_boilerplate(
            r#"<div><header data-a="1" data-b="2"><nav class="top">Menu</nav>Brand</header><p>Body &amp; soul</p></div>"#,
        );
        assert!(!cleaned.contains("Menu"));
        assert!(!cleaned.contains("Brand"));
        assert!(cleaned.contains("Body &amp; soul"));
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let html = "<html><body><nav>Menu</nav><div><p>Plain body text.</p></div></body></html>";
        let (title, text) = HttpFetcher::extract(html);
        assert!(title.is_none());
        assert!(text.contains("Plain body text."));
        assert!(!text.contains("Menu"));
    }

    #[test]
    fn test_empty_page_yields_empty_text() {
        let html = "<html><body><script>render()</script></body></html>";
        let (_, text) = HttpFetcher::extract(html);
        assert!(text.is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("a  \n\n\n\nb\n"), "a\n\nb");
        assert_eq!(normalize_whitespace("\n\n  \n"), "");
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_url_without_network() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
