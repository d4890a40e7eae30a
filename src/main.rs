//! Sumi-Sieve main entry point
//!
//! This is the command-line interface for the Sumi-Sieve page sifter.

use clap::Parser;
use std::path::PathBuf;
use sumi_sieve::config::{load_config_with_hash, load_url_list, Config};
use sumi_sieve::output::{
    export_csv, export_json, export_xml, print_report, write_markdown_report, BatchReport,
};
use sumi_sieve::Pipeline;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Sieve: A polite page sifter
///
/// Sumi-Sieve fetches a list of web pages at a respectful pace, extracts
/// their readable text, and labels each page with a topic category and a
/// quality score.
#[derive(Parser, Debug)]
#[command(name = "sumi-sieve")]
#[command(version = "1.0.0")]
#[command(about = "A polite page sifter", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URLs to process, in addition to those in the config and URL file
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// File with one URL per line (`#` starts a comment)
    #[arg(long, value_name = "FILE")]
    urls_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be processed without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Number of concurrent workers (overrides the config)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Write a JSON export here (overrides the config)
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Write a CSV export here (overrides the config)
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write an XML export here (overrides the config)
    #[arg(long, value_name = "FILE")]
    xml: Option<PathBuf>,

    /// Write a markdown report here (overrides the config)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let urls = collect_urls(&config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &urls, &cli);
        return Ok(());
    }

    handle_batch(&config, &config_hash, &urls, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sieve=info,warn"),
            1 => EnvFilter::new("sumi_sieve=debug,info"),
            2 => EnvFilter::new("sumi_sieve=trace,debug"),
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

/// Config URLs, then the URL file, then positional URLs
fn collect_urls(config: &Config, cli: &Cli) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut urls = config.input.urls.clone();

    if let Some(path) = &cli.urls_file {
        let from_file = load_url_list(path)?;
        tracing::info!("Loaded {} URLs from {}", from_file.len(), path.display());
        urls.extend(from_file);
    }

    urls.extend(cli.urls.iter().cloned());
    Ok(urls)
}

/// Output path from the CLI flag, falling back to the config
fn output_path(flag: &Option<PathBuf>, configured: &Option<String>) -> Option<PathBuf> {
    flag.clone().or_else(|| configured.as_ref().map(PathBuf::from))
}

/// Handles the --dry-run mode: validates config and shows what would be processed
fn handle_dry_run(config: &Config, urls: &[String], cli: &Cli) {
    println!("=== Sumi-Sieve Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Timeout: {}s", config.scraper.timeout_secs);
    println!("  Max retries: {}", config.scraper.max_retries);
    println!(
        "  Workers: {}",
        cli.workers.unwrap_or(config.scraper.workers as usize)
    );
    println!("  User agent: {}", config.scraper.user_agent);

    println!("\nRate Limiting:");
    println!("  Scope: {:?}", config.rate_limit.scope);
    println!("  Base delay: {}ms", config.rate_limit.base_delay_ms);
    println!("  Adaptive: {}", config.rate_limit.adaptive);

    println!(
        "\nCategories: {}",
        if config.categories.is_empty() {
            "built-in table".to_string()
        } else {
            format!("{} configured", config.categories.len())
        }
    );
    match &config.analysis {
        Some(analysis) if analysis.enabled => println!("Analysis: {}", analysis.model),
        _ => println!("Analysis: disabled"),
    }

    println!("\nURLs ({}):", urls.len());
    for url in urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} URLs", urls.len());
}

/// Runs the batch, then writes the exports and report
async fn handle_batch(
    config: &Config,
    config_hash: &str,
    urls: &[String],
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    if urls.is_empty() {
        tracing::warn!("No URLs to process");
    }

    let mut pipeline = Pipeline::from_config(config)?;
    if let Some(workers) = cli.workers {
        pipeline = pipeline.with_workers(workers);
    }

    // Stop taking new URLs on Ctrl-C; in-flight URLs finish
    let stop = CancellationToken::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight URLs");
            signal_stop.cancel();
        }
    });

    let records = pipeline.run(urls, &stop).await;
    let report = BatchReport::from_records(&records).with_config_hash(config_hash);

    if let Some(path) = output_path(&cli.json, &config.output.json_path) {
        export_json(&records, &path)?;
    }
    if let Some(path) = output_path(&cli.csv, &config.output.csv_path) {
        export_csv(&records, &path)?;
    }
    if let Some(path) = output_path(&cli.xml, &config.output.xml_path) {
        export_xml(&records, &path)?;
    }
    if let Some(path) = output_path(&cli.report, &config.output.report_path) {
        write_markdown_report(&report, &records, &path)?;
        tracing::info!("Report written to {}", path.display());
    }

    if !cli.quiet {
        print_report(&report);
    }

    tracing::info!(
        "Batch finished: {}/{} URLs completed",
        report.completed,
        report.total
    );
    Ok(())
}
