//! Per-run crawl session state
//!
//! A [`CrawlSession`] owns everything one crawl invocation mutates: the
//! frontier, the visited set, the accumulated records and the run state.
//! Every call to the crawl entry point builds a fresh session; nothing is
//! shared between runs.

use crate::crawler::frontier::Frontier;
use crate::robots::RobotsPolicy;
use crate::state::CrawlState;
use crate::storage::PageRecord;
use crate::url::{extract_domain, is_http_scheme, normalize_url, CanonicalUrl};
use crate::HarvestError;
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// What happened to one URL popped from the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetched and extracted; the record was persisted
    Extracted,

    /// Canonical form was already visited; discarded without a fetch
    AlreadyVisited,

    /// robots.txt disallows the URL; not fetched
    Disallowed,

    /// The server could not be reached
    FetchFailed,

    /// The body could not be turned into a record; links were still followed
    ExtractionFailed,
}

/// Summary of one crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Pages visited (fetched or skipped after dequeue)
    pub total_pages: usize,

    /// Records produced
    pub total_items: usize,

    /// Target domain
    pub domain: String,

    /// Seed URL as given, trimmed of surrounding whitespace
    pub start_url: String,
}

/// Everything a crawl run returns, including partial results after an abort
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub state: CrawlState,
    pub pages: Vec<PageRecord>,
    pub summary: CrawlSummary,
}

/// Mutable state of one breadth-first crawl over a single domain
#[derive(Debug)]
pub struct CrawlSession {
    seed: String,
    domain: String,
    max_pages: usize,
    robots: RobotsPolicy,
    frontier: Frontier,
    visited: HashSet<CanonicalUrl>,
    results: Vec<PageRecord>,
    result_urls: HashSet<CanonicalUrl>,
    state: CrawlState,
}

impl CrawlSession {
    /// Creates a session with the seed as the only frontier entry
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL; queued and reported exactly as given
    /// * `domain` - Target domain (`host[:port]`); links elsewhere are ignored
    /// * `max_pages` - Upper bound on visited URLs
    /// * `robots` - Policy loaded for the target domain
    pub fn new(seed: String, domain: String, max_pages: usize, robots: RobotsPolicy) -> Self {
        let mut frontier = Frontier::new();
        frontier.push(seed.clone());

        Self {
            seed,
            domain,
            max_pages,
            robots,
            frontier,
            visited: HashSet::new(),
            results: Vec::new(),
            result_urls: HashSet::new(),
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn results(&self) -> &[PageRecord] {
        &self.results
    }

    /// Moves the session to a new state
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition was applied
    /// * `Err(HarvestError::InvalidTransition)` - The transition is not allowed
    pub fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Returns true once the frontier is empty or the page budget is spent
    pub fn is_finished(&self) -> bool {
        self.frontier.is_empty() || self.visited.len() >= self.max_pages
    }

    /// Pops the next pending URL, releasing its frontier membership
    pub fn pop_next(&mut self) -> Option<String> {
        self.frontier.pop()
    }

    /// Adds a URL to the visited set
    ///
    /// # Returns
    ///
    /// `false` if its canonical form was already visited
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(normalize_url(url))
    }

    pub fn robots_allows(&self, url: &str) -> bool {
        self.robots.can_fetch(url)
    }

    /// Checks whether a discovered URL may enter the frontier
    ///
    /// A URL is admitted only if it is http(s), on exactly the target domain,
    /// neither visited nor already queued, and allowed by robots.txt.
    pub fn is_valid_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        if !is_http_scheme(&parsed) {
            return false;
        }

        if extract_domain(&parsed).as_deref() != Some(self.domain.as_str()) {
            return false;
        }

        let canonical = normalize_url(url);
        if self.visited.contains(&canonical) || self.frontier.contains(&canonical) {
            return false;
        }

        self.robots.can_fetch(url)
    }

    /// Enqueues every admissible link in discovery order
    ///
    /// # Returns
    ///
    /// The links that were added to the frontier
    pub fn discover_links<I>(&mut self, links: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut admitted = Vec::new();
        for link in links {
            if self.is_valid_url(&link) && self.frontier.push(link.clone()) {
                admitted.push(link);
            }
        }
        admitted
    }

    /// Appends a record unless one with the same canonical URL exists
    ///
    /// # Returns
    ///
    /// `true` if the record was added
    pub fn record(&mut self, record: PageRecord) -> bool {
        if !self.result_urls.insert(normalize_url(&record.url)) {
            return false;
        }
        self.results.push(record);
        true
    }

    /// Consumes the session into its report
    pub fn into_report(self) -> CrawlReport {
        let summary = CrawlSummary {
            total_pages: self.visited.len(),
            total_items: self.results.len(),
            domain: self.domain,
            start_url: self.seed,
        };

        CrawlReport {
            state: self.state,
            pages: self.results,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(max_pages: usize) -> CrawlSession {
        session_with_robots(max_pages, RobotsPolicy::allow_all())
    }

    fn session_with_robots(max_pages: usize, robots: RobotsPolicy) -> CrawlSession {
        CrawlSession::new(
            "https://example.com".to_string(),
            "example.com".to_string(),
            max_pages,
            robots,
        )
    }

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            headings: Vec::new(),
            paragraphs: Vec::new(),
            link_count: 0,
            crawled_at: Utc::now(),
            status_code: 200,
        }
    }

    #[test]
    fn test_new_session_queues_seed() {
        let session = session(5);
        assert_eq!(session.state(), CrawlState::Idle);
        assert_eq!(
            session.frontier().iter().collect::<Vec<_>>(),
            vec!["https://example.com"]
        );
        assert_eq!(session.visited_count(), 0);
    }

    #[test]
    fn test_discovery_keeps_same_domain_links_only() {
        let mut session = session(5);
        let seed = session.pop_next().unwrap();
        assert!(session.mark_visited(&seed));

        let admitted = session.discover_links(vec![
            "https://example.com/about".to_string(),
            "https://example.com/contact".to_string(),
            "https://other.com/page".to_string(),
        ]);

        assert_eq!(
            admitted,
            vec!["https://example.com/about", "https://example.com/contact"]
        );
        assert_eq!(session.frontier().len(), 2);
        assert!(session.frontier().iter().all(|url| !url.contains("other.com")));
    }

    #[test]
    fn test_subdomains_and_other_schemes_rejected() {
        let session = session(5);
        assert!(!session.is_valid_url("https://blog.example.com/post"));
        assert!(!session.is_valid_url("https://example.com:8443/post"));
        assert!(!session.is_valid_url("ftp://example.com/file"));
        assert!(!session.is_valid_url("mailto:someone@example.com"));
        assert!(!session.is_valid_url("not a url"));
        assert!(session.is_valid_url("http://example.com/plain"));
    }

    #[test]
    fn test_visited_and_queued_urls_not_readmitted() {
        let mut session = session(5);
        let seed = session.pop_next().unwrap();
        session.mark_visited(&seed);

        // Seed variants are visited
        assert!(!session.is_valid_url("https://example.com/#top"));

        let admitted = session.discover_links(vec![
            "https://example.com/a".to_string(),
            "https://example.com/a/".to_string(),
            "https://example.com/a#frag".to_string(),
        ]);
        assert_eq!(admitted, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_robots_disallowed_links_not_admitted() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /private\n", "Bot");
        let mut session = session_with_robots(5, robots);

        let admitted = session.discover_links(vec![
            "https://example.com/private/page".to_string(),
            "https://example.com/public".to_string(),
        ]);
        assert_eq!(admitted, vec!["https://example.com/public"]);
    }

    #[test]
    fn test_mark_visited_is_idempotent_guard() {
        let mut session = session(5);
        assert!(session.mark_visited("https://example.com/page"));
        assert!(!session.mark_visited("https://example.com/page/"));
        assert_eq!(session.visited_count(), 1);
    }

    #[test]
    fn test_budget_finishes_session() {
        let mut session = session(1);
        assert!(!session.is_finished());

        let seed = session.pop_next().unwrap();
        session.mark_visited(&seed);
        session.discover_links(vec!["https://example.com/next".to_string()]);

        assert_eq!(session.frontier().len(), 1);
        assert!(session.is_finished());
    }

    #[test]
    fn test_record_dedupes_by_canonical_url() {
        let mut session = session(5);
        assert!(session.record(record("https://example.com/a")));
        assert!(!session.record(record("https://example.com/a/")));
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_transitions() {
        let mut session = session(5);
        assert!(session.transition(CrawlState::Completed).is_err());
        session.transition(CrawlState::Running).unwrap();
        session.transition(CrawlState::Aborted).unwrap();
        assert!(matches!(
            session.transition(CrawlState::Running),
            Err(HarvestError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_into_report_summary() {
        let mut session = session(5);
        let seed = session.pop_next().unwrap();
        session.mark_visited(&seed);
        session.mark_visited("https://example.com/skipped");
        session.record(record(&seed));

        let report = session.into_report();
        assert_eq!(report.state, CrawlState::Idle);
        assert_eq!(report.pages.len(), 1);
        assert_eq!(
            report.summary,
            CrawlSummary {
                total_pages: 2,
                total_items: 1,
                domain: "example.com".to_string(),
                start_url: "https://example.com".to_string(),
            }
        );
    }
}
