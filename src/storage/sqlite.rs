//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::CrawlState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{PageRecord, RunRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const PAGE_COLUMNS: &str =
    "url, title, description, headings, paragraphs, link_count, crawled_at, status_code";

const RUN_COLUMNS: &str = "id, seed_url, domain, started_at, finished_at, status, \
     pages_visited, items_extracted, config_hash";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    owner: String,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            owner: String::new(),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            owner: String::new(),
        })
    }

    /// Scopes page upserts and reads to an owning identity
    ///
    /// Records of different owners never overwrite each other.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

/// Wraps a column decoding failure as a rusqlite conversion error
fn conversion_error<E>(index: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
}

fn page_from_row(row: &Row) -> rusqlite::Result<PageRecord> {
    let headings: String = row.get(3)?;
    let paragraphs: String = row.get(4)?;
    let crawled_at: String = row.get(6)?;

    Ok(PageRecord {
        url: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        headings: serde_json::from_str(&headings).map_err(|e| conversion_error(3, e))?,
        paragraphs: serde_json::from_str(&paragraphs).map_err(|e| conversion_error(4, e))?,
        link_count: row.get::<_, i64>(5)?.max(0) as usize,
        crawled_at: DateTime::parse_from_rfc3339(&crawled_at)
            .map_err(|e| conversion_error(6, e))?
            .with_timezone(&Utc),
        status_code: row.get(7)?,
    })
}

fn run_from_row(row: &Row) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        domain: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        status: CrawlState::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(CrawlState::Aborted),
        pages_visited: row.get::<_, i64>(6)?.max(0) as usize,
        items_extracted: row.get::<_, i64>(7)?.max(0) as usize,
        config_hash: row.get(8)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Page Records =====

    fn upsert_page(&mut self, record: &PageRecord) -> StorageResult<()> {
        let headings = serde_json::to_string(&record.headings)?;
        let paragraphs = serde_json::to_string(&record.paragraphs)?;

        self.conn.execute(
            "INSERT INTO crawled (owner, url, title, description, headings, paragraphs,
                                  link_count, crawled_at, status_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(owner, url) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                headings = excluded.headings,
                paragraphs = excluded.paragraphs,
                link_count = excluded.link_count,
                crawled_at = excluded.crawled_at,
                status_code = excluded.status_code",
            params![
                self.owner,
                record.url,
                record.title,
                record.description,
                headings,
                paragraphs,
                record.link_count as i64,
                record.crawled_at.to_rfc3339(),
                record.status_code,
            ],
        )?;
        Ok(())
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM crawled WHERE owner = ?1 AND url = ?2",
                    PAGE_COLUMNS
                ),
                params![self.owner, url],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn list_pages(&self) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawled WHERE owner = ?1 ORDER BY crawled_at DESC, id DESC",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![self.owner], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawled WHERE owner = ?1",
            params![self.owner],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_status(&self) -> StorageResult<BTreeMap<u16, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT status_code, COUNT(*) FROM crawled WHERE owner = ?1 GROUP BY status_code",
        )?;

        let mut counts = BTreeMap::new();
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok((row.get::<_, u16>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count as u64);
        }
        Ok(counts)
    }

    // ===== Deletion =====

    fn delete_by_url(&mut self, url: &str) -> StorageResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM crawled WHERE url = ?1", params![url])?;
        Ok(deleted)
    }

    fn delete_by_domain(&mut self, substring: &str) -> StorageResult<usize> {
        // instr() avoids LIKE wildcard and case folding surprises
        let deleted = self.conn.execute(
            "DELETE FROM crawled WHERE instr(url, ?1) > 0",
            params![substring],
        )?;
        Ok(deleted)
    }

    fn delete_all(&mut self) -> StorageResult<usize> {
        let deleted = self.conn.execute("DELETE FROM crawled", [])?;
        Ok(deleted)
    }

    fn delete_by_status(&mut self, status_code: u16) -> StorageResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM crawled WHERE status_code = ?1",
            params![status_code],
        )?;
        Ok(deleted)
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        seed_url: &str,
        domain: &str,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (seed_url, domain, started_at, status, config_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                seed_url,
                domain,
                now,
                CrawlState::Running.to_db_string(),
                config_hash
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: CrawlState,
        pages_visited: usize,
        items_extracted: usize,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3,
                             items_extracted = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                pages_visited as i64,
                items_extracted as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }
}
