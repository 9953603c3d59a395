//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! one crawl run, including:
//! - Recording the run in storage
//! - Loading robots.txt for the target domain
//! - Driving the breadth-first loop over the session's frontier
//! - Fetching, extracting, persisting and following links
//! - Handling interrupts while keeping partial results

use crate::config::{compute_config_hash, validate, Config};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::parse_html;
use crate::crawler::session::{CrawlReport, CrawlSession, PageOutcome};
use crate::robots::{fetch_robots, fetch_robots_at, RobotsPolicy};
use crate::state::CrawlState;
use crate::storage::{open_storage, Storage};
use crate::url::{parse_seed, robots_url};
use crate::{ConfigError, HarvestError, UrlError};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Why the crawl loop stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopEnd {
    /// Frontier empty or page budget reached
    Exhausted,

    /// Shutdown signal received
    Interrupted,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage> {
    config: Config,
    storage: S,
    client: Client,
    config_hash: String,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The effective crawler configuration
    /// * `storage` - Where page records and the run record are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config, storage: S) -> Result<Self, HarvestError> {
        validate(&config)?;
        let config_hash = compute_config_hash(&config)?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Ok(Self {
            config,
            storage,
            client,
            config_hash,
            shutdown: None,
        })
    }

    /// Installs a shutdown signal
    ///
    /// Once the channel holds `true`, the crawl stops at the next iteration
    /// boundary (or during the inter-request delay) and the run is aborted
    /// with everything collected so far.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs one crawl from the configured start URL
    ///
    /// Only failures before the crawl starts are returned as errors: a
    /// missing or invalid start URL, or a run record that cannot be created.
    /// Anything that goes wrong once the loop runs ends the crawl as
    /// `Aborted` and still returns the partial report.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let start_url = self
            .config
            .crawler
            .start_url
            .as_deref()
            .map(|url| url.trim().to_string())
            .ok_or_else(|| ConfigError::Validation("start_url is required to crawl".to_string()))?;
        // The parsed form only decides the domain and the robots.txt location
        let (seed, domain) = parse_seed(&start_url)?;

        let run_id = self
            .storage
            .create_run(&start_url, &domain, &self.config_hash)?;
        tracing::info!(
            "Starting crawl run {} of {} (max {} pages)",
            run_id,
            start_url,
            self.config.crawler.max_pages
        );

        let robots = self.load_robots(&seed, &domain).await;

        let mut session =
            CrawlSession::new(start_url, domain, self.config.crawler.max_pages, robots);
        session.transition(CrawlState::Running)?;

        let final_state = match self.crawl_loop(&mut session).await {
            Ok(LoopEnd::Exhausted) => CrawlState::Completed,
            Ok(LoopEnd::Interrupted) => {
                tracing::warn!(
                    "Crawl interrupted, keeping {} pages collected so far",
                    session.results().len()
                );
                CrawlState::Aborted
            }
            Err(e) => {
                tracing::error!(
                    "Crawl aborted after {} pages: {}",
                    session.visited_count(),
                    e
                );
                CrawlState::Aborted
            }
        };
        session.transition(final_state)?;

        if let Err(e) = self.storage.finish_run(
            run_id,
            final_state,
            session.visited_count(),
            session.results().len(),
        ) {
            tracing::error!("Failed to record end of run {}: {}", run_id, e);
        }

        tracing::info!(
            "Crawl {}: {} pages visited, {} items extracted",
            final_state,
            session.visited_count(),
            session.results().len()
        );

        Ok(session.into_report())
    }

    /// Loads robots.txt for the target domain under the seed's scheme
    async fn load_robots(&self, seed: &Url, domain: &str) -> RobotsPolicy {
        let crawler_name = &self.config.user_agent.crawler_name;
        let timeout = Duration::from_secs(self.config.crawler.robots_timeout_secs);

        match seed.scheme() {
            "https" => fetch_robots(&self.client, domain, crawler_name, timeout).await,
            scheme => {
                fetch_robots_at(&self.client, &robots_url(scheme, domain), crawler_name, timeout)
                    .await
            }
        }
    }

    /// Processes the frontier until it is exhausted or the crawl must stop
    async fn crawl_loop(&mut self, session: &mut CrawlSession) -> Result<LoopEnd, HarvestError> {
        let delay = Duration::from_millis(self.config.crawler.delay_ms);

        loop {
            if self.shutdown_requested() {
                return Ok(LoopEnd::Interrupted);
            }

            if session.is_finished() {
                return Ok(LoopEnd::Exhausted);
            }

            let Some(url) = session.pop_next() else {
                return Ok(LoopEnd::Exhausted);
            };

            let outcome = self.process_url(session, &url).await?;
            tracing::debug!("{} -> {:?}", url, outcome);

            match outcome {
                PageOutcome::AlreadyVisited | PageOutcome::Disallowed | PageOutcome::FetchFailed => {
                    continue
                }
                PageOutcome::Extracted | PageOutcome::ExtractionFailed => {}
            }

            // No pause after the final request
            if !session.is_finished() && self.pause(delay).await {
                return Ok(LoopEnd::Interrupted);
            }
        }
    }

    /// Runs one URL through robots, fetch, extraction and link discovery
    ///
    /// Only storage failures are returned as errors; every other problem is
    /// reported through the outcome.
    async fn process_url(
        &mut self,
        session: &mut CrawlSession,
        url: &str,
    ) -> Result<PageOutcome, HarvestError> {
        if !session.mark_visited(url) {
            tracing::debug!("Skipping already visited {}", url);
            return Ok(PageOutcome::AlreadyVisited);
        }

        if !session.robots_allows(url) {
            tracing::info!("URL {} disallowed by robots.txt", url);
            return Ok(PageOutcome::Disallowed);
        }

        tracing::info!(
            "Crawling ({}/{}): {}",
            session.visited_count(),
            self.config.crawler.max_pages,
            url
        );

        let timeout = Duration::from_secs(self.config.crawler.request_timeout_secs);
        let (final_url, status_code, body) = match fetch_url(&self.client, url, timeout).await {
            FetchResult::Fetched {
                final_url,
                status_code,
                body,
            } => (final_url, status_code, body),
            FetchResult::Failed { .. } => return Ok(PageOutcome::FetchFailed),
        };

        // Relative links resolve against where redirects ended up
        let base = Url::parse(&final_url)
            .or_else(|_| Url::parse(url))
            .map_err(|e| UrlError::Parse(e.to_string()))?;
        let parsed = parse_html(&body, &base);

        let outcome = match parsed.content {
            Ok(content) => {
                let record = content.into_record(url, status_code);
                self.storage.upsert_page(&record)?;
                session.record(record);
                PageOutcome::Extracted
            }
            Err(e) => {
                tracing::warn!("Failed to extract content from {}: {}", url, e);
                PageOutcome::ExtractionFailed
            }
        };

        let admitted = session.discover_links(parsed.links);
        tracing::debug!("Queued {} new links from {}", admitted.len(), url);

        Ok(outcome)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Waits out the inter-request delay
    ///
    /// # Returns
    ///
    /// `true` if a shutdown was requested before or during the wait
    async fn pause(&mut self, delay: Duration) -> bool {
        if !delay.is_zero() {
            match self.shutdown.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = wait_for_shutdown(rx) => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            }
        }
        self.shutdown_requested()
    }
}

/// Resolves once the channel holds `true`; never resolves if the sender is gone
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Runs a complete crawl operation against the configured database
///
/// This opens the SQLite database named in the configuration and crawls
/// from `crawler.start_url`.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran, possibly ending as `Aborted`
/// * `Err(HarvestError)` - The crawl could not start
///
/// # Example
///
/// ```no_run
/// use site_harvester::config::load_config;
/// use site_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} pages extracted", report.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let mut coordinator = Coordinator::new(config, storage)?;
    coordinator.run().await
}
