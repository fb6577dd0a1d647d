//! Google Sheets worksheet as the shelf.

use async_trait::async_trait;
use sheets_client::SheetsClient;
use tracing::{debug, info};

use super::{check_range, RecordStore, HEADER_ROWS};
use crate::error::StoreError;
use crate::record::ArticleRecord;

/// Last column of the record layout.
const LAST_COLUMN: char = 'E';

pub struct SheetsStore {
    client: SheetsClient,
    spreadsheet_id: String,
    worksheet: String,
    sheet_id: i64,
}

impl SheetsStore {
    /// Resolve the worksheet and make sure its header is ours.
    ///
    /// An empty row 1 gets the header written; any other content is a
    /// `HeaderMismatch`.
    pub async fn connect(
        client: SheetsClient,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let spreadsheet_id = spreadsheet_id.into();
        let worksheet = worksheet.into();

        let sheet_id = client.sheet_id(&spreadsheet_id, &worksheet).await?;
        let store = Self {
            client,
            spreadsheet_id,
            worksheet,
            sheet_id,
        };

        let header_range = store.range(1, Some(1));
        let existing = store
            .client
            .get_values(&store.spreadsheet_id, &header_range)
            .await?;
        let found: Vec<String> = existing
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| cell.trim().to_string())
            .collect();

        if found.iter().all(String::is_empty) {
            info!(worksheet = %store.worksheet, "Writing header row to empty worksheet");
            store
                .client
                .update_values(
                    &store.spreadsheet_id,
                    &header_range,
                    &[ArticleRecord::header_row()],
                )
                .await?;
        } else if !header_matches(&found) {
            return Err(StoreError::HeaderMismatch { found });
        }

        debug!(
            spreadsheet_id = %store.spreadsheet_id,
            worksheet = %store.worksheet,
            sheet_id = store.sheet_id,
            "Connected to worksheet"
        );

        Ok(store)
    }

    /// A1 range over the record columns from row `first` to `last`
    /// (open-ended when `None`).
    fn range(&self, first: usize, last: Option<usize>) -> String {
        let sheet = quote_sheet_name(&self.worksheet);
        match last {
            Some(last) => format!("{}!A{}:{}{}", sheet, first, LAST_COLUMN, last),
            None => format!("{}!A{}:{}", sheet, first, LAST_COLUMN),
        }
    }

    async fn record_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_all().await?.len())
    }
}

/// Worksheet names are always quoted; embedded quotes are doubled.
fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn header_matches(found: &[String]) -> bool {
    let mut cells = found.to_vec();
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
        .iter()
        .map(|c| c.to_ascii_lowercase())
        .eq(ArticleRecord::HEADER.iter().map(|h| h.to_string()))
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StoreError> {
        // Row index is 0-based: HEADER_ROWS is the row right under the header.
        self.client
            .insert_row(&self.spreadsheet_id, self.sheet_id, HEADER_ROWS, &record.to_row())
            .await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        let rows = self
            .client
            .get_values(&self.spreadsheet_id, &self.range(HEADER_ROWS + 1, None))
            .await?;

        Ok(rows.iter().map(|row| ArticleRecord::from_row(row)).collect())
    }

    async fn delete_at(&self, position: usize) -> Result<(), StoreError> {
        self.delete_range(position, 1).await
    }

    async fn delete_range(&self, start: usize, count: usize) -> Result<(), StoreError> {
        if count == 0 {
            return Ok(());
        }

        check_range(start, count, self.record_count().await?)?;

        self.client
            .delete_rows(&self.spreadsheet_id, self.sheet_id, start - 1, start - 1 + count)
            .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_sheet_name() {
        assert_eq!(quote_sheet_name("Sheet1"), "'Sheet1'");
        assert_eq!(quote_sheet_name("Bob's list"), "'Bob''s list'");
    }

    #[test]
    fn test_header_matches() {
        let header = ArticleRecord::header_row();
        assert!(header_matches(&header));

        let mut padded = header.clone();
        padded.push(String::new());
        assert!(header_matches(&padded));

        let upper: Vec<String> = header.iter().map(|h| h.to_uppercase()).collect();
        assert!(header_matches(&upper));

        let swapped = vec!["url".to_string(), "title".to_string()];
        assert!(!header_matches(&swapped));
    }
}
