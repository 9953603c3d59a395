//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::{RunRecord, Storage, FETCH_FAILED_STATUS};
use crate::HarvestError;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of stored pages
    pub total_pages: u64,

    /// Count of pages by HTTP status code
    pub pages_by_status: BTreeMap<u16, u64>,

    /// The most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Number of stored pages with a 2xx status
    pub fn successful_pages(&self) -> u64 {
        self.pages_by_status
            .iter()
            .filter(|(status, _)| (200..300).contains(*status))
            .map(|(_, count)| count)
            .sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, HarvestError> {
    Ok(CrawlStatistics {
        total_pages: storage.count_pages()?,
        pages_by_status: storage.count_by_status()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages stored: {}", stats.total_pages);
    println!();

    if !stats.pages_by_status.is_empty() {
        println!("Pages by Status:");
        for (status, count) in &stats.pages_by_status {
            let percentage = if stats.total_pages > 0 {
                (*count as f64 / stats.total_pages as f64) * 100.0
            } else {
                0.0
            };
            let label = if *status == FETCH_FAILED_STATUS {
                "fetch failed".to_string()
            } else {
                status.to_string()
            };
            println!("  {}: {} ({:.1}%)", label, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run #{}:", run.id);
            println!("  Seed: {}", run.seed_url);
            println!("  Status: {}", run.status);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!(
                "  Pages visited: {}, items extracted: {}",
                run.pages_visited, run.items_extracted
            );
            println!();
        }
        None => println!("No crawl runs recorded.\n"),
    }

    let successful = stats.successful_pages();
    let success_rate = if stats.total_pages > 0 {
        (successful as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages returned 2xx)",
        success_rate, successful, stats.total_pages
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CrawlState;
    use crate::storage::{PageRecord, SqliteStorage};
    use chrono::Utc;

    fn page(url: &str, status_code: u16) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            headings: vec![],
            paragraphs: vec![],
            link_count: 0,
            crawled_at: Utc::now(),
            status_code,
        }
    }

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert_page(&page("https://example.com/", 200)).unwrap();
        storage.upsert_page(&page("https://example.com/a", 200)).unwrap();
        storage.upsert_page(&page("https://example.com/b", 404)).unwrap();
        let run_id = storage
            .create_run("https://example.com/", "example.com", "hash")
            .unwrap();
        storage
            .finish_run(run_id, CrawlState::Completed, 3, 3)
            .unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.pages_by_status.get(&200), Some(&2));
        assert_eq!(stats.pages_by_status.get(&404), Some(&1));
        assert_eq!(stats.successful_pages(), 2);
        assert_eq!(stats.latest_run.unwrap().status, CrawlState::Completed);
    }

    #[test]
    fn test_empty_database() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_pages, 0);
        assert!(stats.pages_by_status.is_empty());
        assert!(stats.latest_run.is_none());
        assert_eq!(stats.successful_pages(), 0);
    }
}
