//! HTML parser for extracting page content and links
//!
//! This module turns a fetched HTML body into:
//! - The structured content persisted for each page (title, description,
//!   headings, paragraphs, link count)
//! - The absolute URLs of every `<a href>` on the page, for link discovery

use crate::storage::PageRecord;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Title used when a page has no usable `<title>`
pub const NO_TITLE: &str = "No title";

/// Maximum number of headings kept per page
pub const MAX_HEADINGS: usize = 5;

/// Maximum number of paragraphs kept per page
pub const MAX_PARAGRAPHS: usize = 3;

/// Errors raised while extracting page content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Structured content extracted from one HTML page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    /// Text of the first `<title>`, trimmed, or [`NO_TITLE`]
    pub title: String,

    /// `content` of `<meta name="description">`, or empty
    pub description: String,

    /// Text of `<h1>`-`<h3>` elements in document order, at most five
    pub headings: Vec<String>,

    /// Text of the first three `<p>` elements
    pub paragraphs: Vec<String>,

    /// Number of `<a>` elements on the page, valid or not
    pub link_count: usize,

    /// Wall-clock time of extraction
    pub crawled_at: DateTime<Utc>,
}

impl ExtractedContent {
    /// Builds the persisted record for the page this content came from
    pub fn into_record(self, url: impl Into<String>, status_code: u16) -> PageRecord {
        PageRecord {
            url: url.into(),
            title: self.title,
            description: self.description,
            headings: self.headings,
            paragraphs: self.paragraphs,
            link_count: self.link_count,
            crawled_at: self.crawled_at,
            status_code,
        }
    }
}

/// Everything the crawler needs from one HTML body
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Extracted content, or the reason extraction failed
    pub content: Result<ExtractedContent, ExtractError>,

    /// All `<a href>` targets resolved to absolute URLs, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts both content and links
///
/// The document is parsed once. A failed content extraction does not prevent
/// link discovery; the links are still resolved from whatever parsed.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use site_harvester::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.content.unwrap().title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        content: extract_from_document(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the structured content of an HTML page
pub fn extract_content(html: &str) -> Result<ExtractedContent, ExtractError> {
    extract_from_document(&Html::parse_document(html))
}

/// Convenience function for extracting just the links from HTML
pub fn extract_links_simple(html: &str, base_url: &Url) -> Vec<String> {
    extract_links(&Html::parse_document(html), base_url)
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn extract_from_document(document: &Html) -> Result<ExtractedContent, ExtractError> {
    let title = document
        .select(&selector("title")?)
        .next()
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description = document
        .select(&selector(r#"meta[name="description"]"#)?)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    let headings = document
        .select(&selector("h1, h2, h3")?)
        .take(MAX_HEADINGS)
        .map(|element| element_text(&element))
        .collect();

    let paragraphs = document
        .select(&selector("p")?)
        .take(MAX_PARAGRAPHS)
        .map(|element| element_text(&element))
        .collect();

    let link_count = document.select(&selector("a")?).count();

    Ok(ExtractedContent {
        title,
        description,
        headings,
        paragraphs,
        link_count,
        crawled_at: Utc::now(),
    })
}

/// Collects an element's text with whitespace runs collapsed to one space
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href against the page URL
///
/// Returns None for empty hrefs and hrefs that cannot be joined. Scheme and
/// domain filtering happen at frontier admission, not here.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base_url.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        let content = extract_content(html).unwrap();
        assert_eq!(content.title, "Test Page");
    }

    #[test]
    fn test_missing_title_uses_placeholder() {
        let content = extract_content("<html><head></head><body></body></html>").unwrap();
        assert_eq!(content.title, NO_TITLE);

        let content = extract_content("<title>   </title>").unwrap();
        assert_eq!(content.title, NO_TITLE);
    }

    #[test]
    fn test_description() {
        let html = r#"<html><head>
            <meta name="keywords" content="ignored">
            <meta name="description" content="  A page about things. ">
        </head></html>"#;
        let content = extract_content(html).unwrap();
        assert_eq!(content.description, "A page about things.");
    }

    #[test]
    fn test_missing_description_is_empty() {
        let content = extract_content("<html><head><title>x</title></head></html>").unwrap();
        assert_eq!(content.description, "");
    }

    #[test]
    fn test_headings_in_document_order_truncated() {
        let html = r#"<body>
            <h2>Two</h2><h1>One</h1><h4>Ignored</h4><h3>Three</h3>
            <h1>Four</h1><h2>Five</h2><h3>Six</h3>
        </body>"#;
        let content = extract_content(html).unwrap();
        assert_eq!(content.headings, vec!["Two", "One", "Three", "Four", "Five"]);
    }

    #[test]
    fn test_first_three_paragraphs() {
        let html = "<p>a</p><p>b</p><p>c</p><p>d</p>";
        let content = extract_content(html).unwrap();
        assert_eq!(content.paragraphs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_text_is_collapsed() {
        let html = "<h1>Hello\n   <em>big</em>   world</h1><p> spaced\t\tout </p>";
        let content = extract_content(html).unwrap();
        assert_eq!(content.headings, vec!["Hello big world"]);
        assert_eq!(content.paragraphs, vec!["spaced out"]);
    }

    #[test]
    fn test_link_count_includes_all_anchors() {
        let html = r#"<body>
            <a href="/a">a</a>
            <a href="https://other.com/">b</a>
            <a href="mailto:x@example.com">c</a>
            <a name="anchor-without-href">d</a>
        </body>"#;
        let content = extract_content(html).unwrap();
        assert_eq!(content.link_count, 4);
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let html = "<html><head><title>Broken<body><p>unclosed <div><h1>Head</p></h1>";
        let parsed = parse_html(html, &base_url());
        assert!(parsed.content.is_ok());
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://other.com/page">Link</a>"#;
        let links = extract_links_simple(html, &base_url());
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<a href="/other">1</a><a href="sibling">2</a><a href="../up">3</a>"#;
        let links = extract_links_simple(html, &base_url());
        assert_eq!(
            links,
            vec![
                "https://example.com/other",
                "https://example.com/sibling",
                "https://example.com/up",
            ]
        );
    }

    #[test]
    fn test_empty_href_skipped() {
        let html = r#"<a href="">empty</a><a href="   ">blank</a><a>none</a>"#;
        assert!(extract_links_simple(html, &base_url()).is_empty());
    }

    #[test]
    fn test_non_http_links_are_resolved_not_filtered() {
        let html = r#"<a href="mailto:test@example.com">Email</a>"#;
        let links = extract_links_simple(html, &base_url());
        assert_eq!(links, vec!["mailto:test@example.com"]);
    }

    #[test]
    fn test_parse_html_returns_content_and_links() {
        let html = r#"<html><head><title>Home</title></head>
            <body><h1>Welcome</h1><p>Intro</p><a href="/next">Next</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        let content = parsed.content.unwrap();
        assert_eq!(content.title, "Home");
        assert_eq!(content.headings, vec!["Welcome"]);
        assert_eq!(content.paragraphs, vec!["Intro"]);
        assert_eq!(content.link_count, 1);
        assert_eq!(parsed.links, vec!["https://example.com/next"]);
    }

    #[test]
    fn test_into_record_keeps_url_and_status() {
        let content = extract_content("<title>Gone</title>").unwrap();
        let record = content.into_record("https://example.com/missing/", 404);
        assert_eq!(record.url, "https://example.com/missing/");
        assert_eq!(record.title, "Gone");
        assert_eq!(record.status_code, 404);
    }
}
