//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester crawler and its
//! administrative database operations.

use anyhow::{bail, Context};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use site_harvester::config::{load_config, validate, Config};
use site_harvester::crawler::Coordinator;
use site_harvester::output::{export_json, load_statistics, print_statistics, print_summary};
use site_harvester::storage::{open_storage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Site-Harvester: a single-domain content crawler
///
/// Crawls one domain breadth-first from a start URL, respecting robots.txt,
/// and stores title, description, headings and paragraphs of every page in
/// SQLite. Re-crawling a page overwrites its record.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version)]
#[command(about = "A single-domain content crawler", long_about = None)]
struct Cli {
    /// Start URL of the crawl
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Maximum number of pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Delay between requests in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, value_name = "PATH")]
    db_file: Option<String>,

    /// Also merge the results into a JSON file
    #[arg(long)]
    save_to_json: bool,

    /// JSON file used with --save-to-json
    #[arg(long, value_name = "PATH")]
    json_file: Option<String>,

    /// Delete the record of one URL and exit
    #[arg(long, value_name = "URL", conflicts_with_all = ["delete_domain", "clear_db", "delete_404", "stats"])]
    delete_url: Option<String>,

    /// Delete every record whose URL contains SUBSTRING and exit
    #[arg(
        long,
        value_name = "SUBSTRING",
        value_parser = NonEmptyStringValueParser::new(),
        conflicts_with_all = ["delete_url", "clear_db", "delete_404", "stats"]
    )]
    delete_domain: Option<String>,

    /// Delete every record and exit
    #[arg(long, conflicts_with_all = ["delete_url", "delete_domain", "delete_404", "stats"])]
    clear_db: bool,

    /// Delete every record with status 404 and exit
    #[arg(long, conflicts_with_all = ["delete_url", "delete_domain", "clear_db", "stats"])]
    delete_404: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["delete_url", "delete_domain", "clear_db", "delete_404"])]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_url) = &self.start_url {
            config.crawler.start_url = Some(start_url.clone());
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.crawler.delay_ms = delay_ms;
        }
        if let Some(db_file) = &self.db_file {
            config.output.database_path = db_file.clone();
        }
        if self.save_to_json {
            config.output.save_json = true;
        }
        if let Some(json_file) = &self.json_file {
            config.output.json_path = json_file.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    if let Some(url) = &cli.delete_url {
        let deleted = open_db(&config)?.delete_by_url(url)?;
        println!("Deleted {} record(s) for {}", deleted, url);
    } else if let Some(substring) = &cli.delete_domain {
        let deleted = open_db(&config)?.delete_by_domain(substring)?;
        println!("Deleted {} record(s) containing '{}'", deleted, substring);
    } else if cli.clear_db {
        let deleted = open_db(&config)?.delete_all()?;
        println!("Deleted all {} record(s)", deleted);
    } else if cli.delete_404 {
        let deleted = open_db(&config)?.delete_by_status(404)?;
        println!("Deleted {} record(s) with status 404", deleted);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvester=info,warn"),
            1 => EnvFilter::new("site_harvester=debug,info"),
            2 => EnvFilter::new("site_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_db(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_db(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    if config.crawler.start_url.is_none() {
        bail!("No start URL given; pass --start-url or set crawler.start-url in the config");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            let _ = shutdown_tx.send(true);
        }
    });

    let save_json = config.output.save_json;
    let json_path = PathBuf::from(&config.output.json_path);

    let storage = open_db(&config)?;
    let mut coordinator = Coordinator::new(config, storage)?.with_shutdown(shutdown_rx);
    let report = coordinator.run().await.context("Crawl could not start")?;

    if save_json {
        if let Err(e) = export_json(&json_path, &report.pages) {
            tracing::error!("Failed to save JSON export {}: {}", json_path.display(), e);
        }
    }

    println!();
    print_summary(&report);

    Ok(())
}
