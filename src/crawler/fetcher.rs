//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - Building the HTTP client with the crawler's user agent string
//! - GET requests with a per-request timeout
//! - Surfacing HTTP error statuses (notably 404) as data instead of errors

use crate::config::UserAgentConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The server answered; the status may be any code, including 4xx/5xx
    Fetched {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// No response could be obtained (connect error, timeout, broken body)
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the status code, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Fetched { status_code, .. } => Some(*status_code),
            Self::Failed { .. } => None,
        }
    }

    /// Returns true if the fetch could not reach the server at all
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy. Both http and https
/// targets are allowed, since the crawl follows whatever scheme the seed uses.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Default timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use site_harvester::config::UserAgentConfig;
/// use site_harvester::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Fetched` |
/// | 404 | `Fetched` with status 404, logged as a warning |
/// | other 4xx/5xx | `Fetched` with that status, logged as an error |
/// | timeout / connect error / unreadable body | `Failed` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Request timeout
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            tracing::error!("Error fetching {}: {}", url, error);
            return FetchResult::Failed { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::NOT_FOUND {
        tracing::warn!("404 found: {}", url);
    } else if !status.is_success() {
        tracing::error!("HTTP error fetching {}: {}", url, status.as_u16());
    }

    match response.text().await {
        Ok(body) => FetchResult::Fetched {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => {
            tracing::error!("Error reading body of {}: {}", url, e);
            FetchResult::Failed {
                error: e.to_string(),
            }
        }
    }
}
