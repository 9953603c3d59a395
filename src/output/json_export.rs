//! JSON export of crawled pages
//!
//! The export file is a single JSON array that grows across runs. Existing
//! entries are kept as they are, whatever their shape, and a page is only
//! appended if no entry with the same canonical URL is present yet.

use crate::storage::PageRecord;
use crate::url::{normalize_url, CanonicalUrl};
use crate::HarvestError;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Merges records into a JSON export file
///
/// A missing file starts a new export. A file that does not hold a JSON
/// array is logged and replaced.
///
/// # Arguments
///
/// * `path` - The export file
/// * `records` - Pages from the current run
///
/// # Returns
///
/// * `Ok(usize)` - Number of entries in the file after the merge
/// * `Err(HarvestError)` - The file could not be written
pub fn export_json(path: &Path, records: &[PageRecord]) -> Result<usize, HarvestError> {
    let mut entries = load_existing(path);

    let mut seen: HashSet<CanonicalUrl> = entries
        .iter()
        .map(|entry| normalize_url(entry.get("url").and_then(Value::as_str).unwrap_or("")))
        .collect();

    let mut added = 0;
    for record in records {
        if record.url.is_empty() || !seen.insert(normalize_url(&record.url)) {
            continue;
        }
        entries.push(serde_json::to_value(record)?);
        added += 1;
    }

    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json)?;

    tracing::info!(
        "Saved JSON export {} ({} entries, {} new)",
        path.display(),
        entries.len(),
        added
    );
    Ok(entries.len())
}

fn load_existing(path: &Path) -> Vec<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Could not read {}: {}. Starting a new export.", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Existing export {} is not a JSON array: {}. Starting a new export.",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            headings: vec![],
            paragraphs: vec![],
            link_count: 0,
            crawled_at: Utc::now(),
            status_code: 200,
        }
    }

    fn read_urls(path: &Path) -> Vec<String> {
        let entries: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        entries
            .iter()
            .map(|e| e["url"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_creates_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawled_data.json");

        let total = export_json(&path, &[record("https://example.com/")]).unwrap();
        assert_eq!(total, 1);
        assert_eq!(read_urls(&path), vec!["https://example.com/"]);
    }

    #[test]
    fn test_merge_dedupes_by_canonical_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawled_data.json");

        export_json(&path, &[record("https://example.com/a")]).unwrap();
        let total = export_json(
            &path,
            &[
                record("https://example.com/a/"),
                record("https://example.com/a#frag"),
                record("https://example.com/b"),
            ],
        )
        .unwrap();

        assert_eq!(total, 2);
        assert_eq!(
            read_urls(&path),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_foreign_entries_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawled_data.json");
        std::fs::write(&path, r#"[{"url": "https://example.com/old", "extra": true}, {"note": 1}]"#)
            .unwrap();

        let total = export_json(&path, &[record("https://example.com/new")]).unwrap();
        assert_eq!(total, 3);

        let entries: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries[0]["extra"], true);
        assert_eq!(entries[1]["note"], 1);
        assert_eq!(entries[2]["url"], "https://example.com/new");
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawled_data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let total = export_json(&path, &[record("https://example.com/")]).unwrap();
        assert_eq!(total, 1);
        assert_eq!(read_urls(&path), vec!["https://example.com/"]);
    }
}
