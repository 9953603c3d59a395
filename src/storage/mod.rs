//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Idempotent upserts of crawled page records
//! - Administrative bulk deletions
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Status code stored for a page whose fetch produced no response
pub const FETCH_FAILED_STATUS: u16 = 0;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// One crawled page
///
/// `url` is the page address as first observed, not its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    pub link_count: usize,
    pub crawled_at: DateTime<Utc>,
    pub status_code: u16,
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub domain: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: CrawlState,
    pub pages_visited: usize,
    pub items_extracted: usize,
    pub config_hash: String,
}
