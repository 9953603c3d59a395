use serde::{Deserialize, Serialize};

/// Main configuration structure for Site-Harvester
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Seed URL; may also be given on the command line
    #[serde(rename = "start-url", default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,

    /// Maximum number of pages visited per run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Fixed delay after each processed page (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Timeout for each page request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the robots.txt request (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the robots.txt product token
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path to the JSON export file
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: String,

    /// Whether to also export crawl results as JSON
    #[serde(rename = "save-json", default)]
    pub save_json: bool,
}

fn default_max_pages() -> usize {
    50
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    10
}

fn default_robots_timeout() -> u64 {
    5
}

fn default_crawler_name() -> String {
    "SiteHarvester".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/site-harvester".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}

fn default_database_path() -> String {
    "crawler.sqlite3".to_string()
}

fn default_json_path() -> String {
    "crawled_data.json".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: None,
            max_pages: default_max_pages(),
            delay_ms: default_delay_ms(),
            request_timeout_secs: default_request_timeout(),
            robots_timeout_secs: default_robots_timeout(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            json_path: default_json_path(),
            save_json: false,
        }
    }
}
