//! Robots.txt handling module
//!
//! This module fetches the target domain's robots.txt once per crawl session
//! and evaluates URLs against it. Loading fails open: if robots.txt cannot be
//! retrieved, every URL is allowed.

mod parser;

pub use parser::RobotsPolicy;

use crate::url::robots_url;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetches robots.txt for a domain over HTTPS
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `domain` - The domain (`host[:port]`) to fetch robots.txt from
/// * `user_agent` - The crawler's product token used for rule matching
/// * `timeout` - Request timeout
///
/// # Returns
///
/// The loaded policy, or an unrestricted policy if loading failed
pub async fn fetch_robots(
    client: &Client,
    domain: &str,
    user_agent: &str,
    timeout: Duration,
) -> RobotsPolicy {
    fetch_robots_at(client, &robots_url("https", domain), user_agent, timeout).await
}

/// Fetches robots.txt from an explicit location
///
/// Only an HTTP 200 response is parsed into rules. Any other status, a
/// network error, or a timeout yields [`RobotsPolicy::allow_all`].
pub async fn fetch_robots_at(
    client: &Client,
    location: &str,
    user_agent: &str,
    timeout: Duration,
) -> RobotsPolicy {
    let response = match client.get(location).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                "Could not load robots.txt from {}: {}. Allowing everything.",
                location,
                e
            );
            return RobotsPolicy::allow_all();
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        tracing::info!(
            "robots.txt not found at {} (status {}), allowing everything",
            location,
            status.as_u16()
        );
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::info!("Loaded robots.txt from {}", location);
            RobotsPolicy::from_content(&body, user_agent)
        }
        Err(e) => {
            tracing::warn!(
                "Could not read robots.txt body from {}: {}. Allowing everything.",
                location,
                e
            );
            RobotsPolicy::allow_all()
        }
    }
}
