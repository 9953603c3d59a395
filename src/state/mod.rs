//! State module for tracking crawl progress
//!
//! - `CrawlState`: the lifecycle of one crawl run (idle, running, completed, aborted)

mod crawl_state;

pub use crawl_state::CrawlState;
