//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Site-Harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    domain TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    items_extracted INTEGER NOT NULL DEFAULT 0,
    config_hash TEXT NOT NULL
);

-- One row per crawled page and owner
CREATE TABLE IF NOT EXISTS crawled (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    headings TEXT NOT NULL DEFAULT '[]',
    paragraphs TEXT NOT NULL DEFAULT '[]',
    link_count INTEGER NOT NULL DEFAULT 0,
    crawled_at TEXT NOT NULL,
    status_code INTEGER NOT NULL DEFAULT 0,
    UNIQUE(owner, url)
);

CREATE INDEX IF NOT EXISTS idx_crawled_url ON crawled(url);
CREATE INDEX IF NOT EXISTS idx_crawled_status ON crawled(status_code);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
