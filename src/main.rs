//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest site harvester.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, validate, Config, QueueOrder};
use sumi_harvest::crawler::crawl;
use sumi_harvest::output::print_report;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a concurrent site harvester
///
/// Sumi-Harvest scans a page for images and frames, downloads every image it
/// finds into the output directory, and optionally follows links that stay on
/// the seed's host. Failed requests are retried with a bounded budget.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version)]
#[command(about = "A concurrent site harvester", long_about = None)]
struct Cli {
    /// Absolute URL to start from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Follow links to pages on the seed's host
    #[arg(short, long)]
    recurse: bool,

    /// Log what would be fetched without downloading anything
    #[arg(long)]
    dry_run: bool,

    /// Directory downloaded files are written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Attempts allowed per task before it is retired
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Order in which queued tasks are dispatched
    #[arg(long, value_enum)]
    queue_order: Option<CliQueueOrder>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliQueueOrder {
    Conjunctive,
    FewestErrorsFirst,
}

impl From<CliQueueOrder> for QueueOrder {
    fn from(order: CliQueueOrder) -> Self {
        match order {
            CliQueueOrder::Conjunctive => QueueOrder::Conjunctive,
            CliQueueOrder::FewestErrorsFirst => QueueOrder::FewestErrorsFirst,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if config.crawler.dry_run {
        tracing::info!("Dry run: nothing will be written");
    }

    let report = crawl(&cli.url, &config)
        .await
        .with_context(|| format!("Failed to crawl {}", cli.url))?;

    if !cli.quiet {
        print_report(&report);
    }

    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.recurse {
        config.crawler.recurse_same_host = true;
    }
    if cli.dry_run {
        config.crawler.dry_run = true;
    }
    if let Some(output) = &cli.output {
        config.crawler.output_directory = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.worker_count = workers;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.crawler.max_attempts = max_attempts;
    }
    if let Some(order) = cli.queue_order {
        config.crawler.queue_order = order.into();
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
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
