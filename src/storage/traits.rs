//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::CrawlState;
use crate::storage::{PageRecord, RunRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Page reads and upserts are scoped to the backend's owner. Deletions are
/// administrative and apply to every owner. None of the deletions fail when
/// nothing matches; they report the number of rows removed.
pub trait Storage {
    // ===== Page Records =====

    /// Inserts a page record or overwrites the existing one with the same URL
    ///
    /// # Arguments
    ///
    /// * `record` - The page to persist
    fn upsert_page(&mut self, record: &PageRecord) -> StorageResult<()>;

    /// Gets a page by its exact URL
    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Lists all pages, most recently crawled first
    fn list_pages(&self) -> StorageResult<Vec<PageRecord>>;

    /// Counts all stored pages
    fn count_pages(&self) -> StorageResult<u64>;

    /// Counts stored pages per status code
    fn count_by_status(&self) -> StorageResult<BTreeMap<u16, u64>>;

    // ===== Deletion =====

    /// Deletes the records with exactly this URL
    fn delete_by_url(&mut self, url: &str) -> StorageResult<usize>;

    /// Deletes every record whose URL contains `substring`
    ///
    /// This is a plain substring match on the whole URL, not a host match:
    /// `"example.com"` also removes `https://notexample.com/` and
    /// `https://other.org/?ref=example.com`.
    fn delete_by_domain(&mut self, substring: &str) -> StorageResult<usize>;

    /// Deletes every record
    fn delete_all(&mut self) -> StorageResult<usize>;

    /// Deletes every record with the given status code
    fn delete_by_status(&mut self, status_code: u16) -> StorageResult<usize>;

    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The crawl's seed URL
    /// * `domain` - The target domain
    /// * `config_hash` - Hash of the effective configuration
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, seed_url: &str, domain: &str, config_hash: &str)
        -> StorageResult<i64>;

    /// Records the final state and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: CrawlState,
        pages_visited: usize,
        items_extracted: usize,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
