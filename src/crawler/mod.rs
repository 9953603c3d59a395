//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching that reports error statuses instead of failing on them
//! - HTML content extraction and link resolution
//! - The breadth-first frontier and per-run session state
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod session;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::Frontier;
pub use parser::{
    extract_content, extract_links_simple, parse_html, ExtractError, ExtractedContent, ParsedPage,
    MAX_HEADINGS, MAX_PARAGRAPHS, NO_TITLE,
};
pub use session::{CrawlReport, CrawlSession, CrawlSummary, PageOutcome};

pub use crate::storage::PageRecord;
