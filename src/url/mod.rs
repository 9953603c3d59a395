//! URL handling module for Site-Harvester
//!
//! This module provides URL canonicalization, domain extraction, and seed
//! validation.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, robots_url};
pub use normalize::{normalize_url, CanonicalUrl};

/// Returns true if the URL uses a scheme the crawler can fetch
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Parses and validates a seed URL
///
/// The seed must be an absolute http(s) URL with a host. Unlike link
/// normalization, a bad seed is a hard error: there is nothing to crawl.
///
/// # Arguments
///
/// * `seed` - The seed URL string
///
/// # Returns
///
/// * `Ok((Url, String))` - The parsed seed and its domain
/// * `Err(UrlError)` - The seed is not crawlable
pub fn parse_seed(seed: &str) -> UrlResult<(Url, String)> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
    Ok((url, domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        let (url, domain) = parse_seed("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
        assert_eq!(domain, "example.com");
    }

    #[test]
    fn test_parse_seed_trims_whitespace() {
        let (_, domain) = parse_seed("  https://example.com/start \n").unwrap();
        assert_eq!(domain, "example.com");
    }

    #[test]
    fn test_parse_seed_invalid_scheme() {
        let result = parse_seed("ftp://example.com/");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_parse_seed_malformed() {
        let result = parse_seed("not a url");
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_is_http_scheme() {
        assert!(is_http_scheme(&Url::parse("http://a.com/").unwrap()));
        assert!(is_http_scheme(&Url::parse("https://a.com/").unwrap()));
        assert!(!is_http_scheme(&Url::parse("mailto:x@a.com").unwrap()));
        assert!(!is_http_scheme(&Url::parse("javascript:void(0)").unwrap()));
    }
}
