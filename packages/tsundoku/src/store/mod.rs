//! Ordered record storage.
//!
//! The shelf is a table: one header row, then one row per record, newest
//! first. Records have no identity beyond their row, so positions are
//! 1-based row numbers with the header as row 1 and the first record at
//! row `HEADER_ROWS + 1`. Any delete shifts every later row up by one.

mod memory;
mod sheets;

pub use memory::MemoryStore;
pub use sheets::SheetsStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::ArticleRecord;

/// Rows above the first record.
pub const HEADER_ROWS: usize = 1;

/// Row number of the newest record.
pub const FIRST_RECORD_ROW: usize = HEADER_ROWS + 1;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert directly below the header, so reads come back newest-first.
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StoreError>;

    /// Every record, top to bottom. Empty when only the header exists.
    async fn read_all(&self) -> Result<Vec<ArticleRecord>, StoreError>;

    /// Delete the record at 1-based row `position`.
    async fn delete_at(&self, position: usize) -> Result<(), StoreError>;

    /// Delete `count` records starting at row `start`. `count == 0` is a no-op.
    async fn delete_range(&self, start: usize, count: usize) -> Result<(), StoreError>;

    /// Backend name (for logging).
    fn name(&self) -> &str;
}

/// Check that rows `start..start + count` all hold records when the store
/// has `len` of them.
pub(crate) fn check_range(start: usize, count: usize, len: usize) -> Result<(), StoreError> {
    let last = HEADER_ROWS + len;
    if start < FIRST_RECORD_ROW {
        return Err(StoreError::OutOfRange {
            position: start,
            first: FIRST_RECORD_ROW,
            last,
        });
    }

    let end = start + count - 1;
    if end > last {
        return Err(StoreError::OutOfRange {
            position: end,
            first: FIRST_RECORD_ROW,
            last,
        });
    }

    Ok(())
}
