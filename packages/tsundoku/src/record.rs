//! The article record and the summary the model produces for it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the model is asked to produce for one article.
///
/// Field docs become the schema `description`s sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArticleSummary {
    /// A short, catchy title for the article
    pub title: String,
    /// A gentle summary of the article in about three sentences
    pub summary: String,
    /// The single most important point of the article
    pub point: String,
    /// One concrete thing the reader should do next because of this article
    pub action: String,
}

/// One shelved article: the model's summary plus the URL the user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub point: String,
    pub action: String,
}

impl ArticleRecord {
    /// Column names of the persisted layout, in column order.
    pub const HEADER: [&'static str; 5] = ["title", "url", "summary", "point", "action"];

    pub fn new(summary: ArticleSummary, url: impl Into<String>) -> Self {
        Self {
            title: summary.title,
            url: url.into(),
            summary: summary.summary,
            point: summary.point,
            action: summary.action,
        }
    }

    /// Cells in `HEADER` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.url.clone(),
            self.summary.clone(),
            self.point.clone(),
            self.action.clone(),
        ]
    }

    /// Build from a stored row; missing trailing cells read as empty.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            title: cell(0),
            url: cell(1),
            summary: cell(2),
            point: cell(3),
            action: cell(4),
        }
    }

    /// The header as owned cells.
    pub fn header_row() -> Vec<String> {
        Self::HEADER.iter().map(|h| h.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArticleRecord {
        ArticleRecord::new(
            ArticleSummary {
                title: "A".into(),
                summary: "S".into(),
                point: "P".into(),
                action: "Act".into(),
            },
            "https://example.com/a",
        )
    }

    #[test]
    fn test_row_follows_header_order() {
        let row = sample().to_row();
        assert_eq!(row, vec!["A", "https://example.com/a", "S", "P", "Act"]);
        assert_eq!(ArticleRecord::from_row(&row), sample());
    }

    #[test]
    fn test_short_row_is_padded() {
        let row = vec!["Only a title".to_string()];
        let record = ArticleRecord::from_row(&row);
        assert_eq!(record.title, "Only a title");
        assert!(record.url.is_empty());
        assert!(record.action.is_empty());
    }

    #[test]
    fn test_summary_schema_has_descriptions() {
        use llm_client::StructuredOutput;

        let schema = ArticleSummary::openai_schema();
        for field in ["title", "summary", "point", "action"] {
            let description = schema["properties"][field]["description"].as_str();
            assert!(description.is_some_and(|d| !d.is_empty()), "{field} lacks a description");
        }
        assert_eq!(schema["required"].as_array().map(Vec::len), Some(4));
    }
}
