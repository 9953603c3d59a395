//! Robots.txt policy evaluation
//!
//! This module wraps the robotstxt crate's matcher behind a fail-open policy
//! type bound to one crawler user agent.

use crate::url::normalize_url;
use robotstxt::DefaultMatcher;
use std::panic::{self, AssertUnwindSafe};

/// The robots.txt policy for one crawl session
///
/// A policy is either unrestricted (robots.txt absent or unreachable) or a
/// rule set parsed from a fetched robots.txt. It is built once when the
/// session starts and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsPolicy {
    /// No usable robots.txt; every URL is allowed
    Unrestricted,

    /// Rules parsed from a robots.txt body
    Rules {
        /// Raw robots.txt content
        content: String,
        /// Product token matched against `User-agent` groups
        user_agent: String,
    },
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `user_agent` - The crawler's product token (e.g., "SiteHarvester")
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        Self::Rules {
            content: content.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// This is used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::Unrestricted
    }

    /// Returns true if this policy carries parsed rules
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Rules { .. })
    }

    /// Checks whether the crawler may fetch a URL
    ///
    /// The URL is canonicalized before matching. A matcher failure allows
    /// the URL rather than blocking the crawl.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed (or the policy could not be evaluated)
    /// * `false` - If robots.txt disallows it
    pub fn can_fetch(&self, url: &str) -> bool {
        let (content, user_agent) = match self {
            Self::Unrestricted => return true,
            Self::Rules {
                content,
                user_agent,
            } => (content, user_agent),
        };

        if content.trim().is_empty() {
            return true;
        }

        let canonical = normalize_url(url);

        // The matcher is a port of Google's C++ parser; a panic on odd input
        // must not take the crawl down with it.
        let verdict = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut matcher = DefaultMatcher::default();
            matcher.one_agent_allowed_by_robots(content, user_agent, canonical.as_str())
        }));

        match verdict {
            Ok(allowed) => allowed,
            Err(_) => {
                tracing::warn!(
                    "robots.txt matcher failed for {}, allowing by default",
                    canonical
                );
                true
            }
        }
    }
}
