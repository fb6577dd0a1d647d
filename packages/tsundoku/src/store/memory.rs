//! In-process record store for tests and throwaway sessions.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_range, RecordStore, HEADER_ROWS};
use crate::error::StoreError;
use crate::record::ArticleRecord;

/// Records held in a `Vec`, index 0 being the row under the header.
///
/// Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ArticleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with records in top-to-bottom order.
    pub fn with_records(records: impl IntoIterator<Item = ArticleRecord>) -> Self {
        Self {
            rows: RwLock::new(records.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StoreError> {
        self.rows.write().await.insert(0, record.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        Ok(self.rows.read().await.clone())
    }

    async fn delete_at(&self, position: usize) -> Result<(), StoreError> {
        self.delete_range(position, 1).await
    }

    async fn delete_range(&self, start: usize, count: usize) -> Result<(), StoreError> {
        if count == 0 {
            return Ok(());
        }

        let mut rows = self.rows.write().await;
        check_range(start, count, rows.len())?;

        let first = start - HEADER_ROWS - 1;
        rows.drain(first..first + count);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
