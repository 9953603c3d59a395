use std::fmt;
use url::Url;

/// A URL in canonical form, used for identity and deduplication
///
/// Two URLs refer to the same page iff their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL for identity comparison
///
/// # Normalization Steps
///
/// 1. Parse the URL; if it is malformed, return the input unchanged
/// 2. Remove the fragment (everything after #)
/// 3. Remove trailing slashes from the path, unless the path is `/`
///
/// Normalization never fails: a crawl must not abort because a single link
/// could not be canonicalized. The result is idempotent.
///
/// # Examples
///
/// ```
/// use site_harvester::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page/#top").as_str(), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/").as_str(), "https://example.com/");
/// ```
pub fn normalize_url(url_str: &str) -> CanonicalUrl {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return CanonicalUrl(url_str.to_string()),
    };

    url.set_fragment(None);

    let path = url.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let normalized_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        url.set_path(&normalized_path);
    }

    CanonicalUrl(url.into())
}
