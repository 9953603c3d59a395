//! Output module for crawl summaries and exports
//!
//! This module handles:
//! - Printing the summary of a finished crawl
//! - Exporting crawled pages to a JSON file
//! - Database statistics

mod json_export;
pub mod stats;

pub use json_export::export_json;
pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;

/// Prints the pages and summary of a crawl run to stdout
///
/// # Arguments
///
/// * `report` - The report returned by the crawl, complete or partial
pub fn print_summary(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");

    for page in &report.pages {
        println!("  [{}] {} - {}", page.status_code, page.url, page.title);
    }
    if !report.pages.is_empty() {
        println!();
    }

    let summary = &report.summary;
    println!("status: {}", report.state);
    println!("total_pages: {}", summary.total_pages);
    println!("total_items: {}", summary.total_items);
    println!("domain: {}", summary.domain);
    println!("start_url: {}", summary.start_url);
}
