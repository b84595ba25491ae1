//! Sumi-Watch main entry point
//!
//! This is the command-line interface for the Sumi-Watch page change monitor.

use clap::Parser;
use std::path::PathBuf;
use sumi_watch::config::{load_config_with_hash, Config};
use sumi_watch::output::{build_notifier, format_batch};
use sumi_watch::source::load_sources;
use sumi_watch::state::is_monitorable_url;
use sumi_watch::watcher::{build_http_client, watch, Monitor};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Watch: a web page change monitor
///
/// Sumi-Watch polls a list of pages, learns the links each one carries, and
/// reports every link that appears afterwards.
#[derive(Parser, Debug)]
#[command(name = "sumi-watch")]
#[command(version = "1.0.0")]
#[command(about = "A web page change monitor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which pages would be monitored
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,

    /// Build the baseline, run a single check cycle, print it and exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config).await?;
    } else if cli.once {
        handle_once(&config).await?;
    } else {
        handle_watch(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_watch=info,warn"),
            1 => EnvFilter::new("sumi_watch=debug,info"),
            2 => EnvFilter::new("sumi_watch=trace,debug"),
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

/// Handles the --dry-run mode: validates config and lists the pages
async fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sumi-Watch Dry Run ===\n");

    println!("Monitor Configuration:");
    println!("  Fetch timeout: {}s", config.monitor.fetch_timeout_secs);
    println!(
        "  Max concurrent fetches: {}",
        config.monitor.max_concurrent_fetches
    );
    println!("  Warm-up cycles: {}", config.monitor.warmup_cycles);
    println!("  Check interval: {}s", config.monitor.check_interval_secs);
    println!("\nUser Agent: {}", config.user_agent.value);
    match &config.notify.webhook_url {
        Some(url) => println!("Notifications: webhook {}", url),
        None => println!("Notifications: log only"),
    }

    let client = build_http_client(&config.user_agent.value, config.monitor.fetch_timeout())?;
    let entries = load_sources(config, &client).await?;

    let (accepted, skipped): (Vec<_>, Vec<_>) = entries
        .iter()
        .partition(|entry| is_monitorable_url(entry.url.trim()));

    println!("\nPages ({}):", accepted.len());
    for entry in &accepted {
        println!("  - {} <{}>", entry.label, entry.url);
    }
    if !skipped.is_empty() {
        println!("\nSkipped, no http URL ({}):", skipped.len());
        for entry in &skipped {
            println!("  - {} '{}'", entry.label, entry.url);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --once mode: baseline plus a single check cycle
async fn handle_once(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_http_client(&config.user_agent.value, config.monitor.fetch_timeout())?;
    let entries = load_sources(config, &client).await?;

    let mut monitor = Monitor::from_config(config)?;
    monitor.build_baseline(&entries).await;
    let records = monitor.check_updates().await;

    if records.is_empty() {
        println!("No changes detected");
    } else {
        print!("{}", format_batch(&records));
    }
    Ok(())
}

/// Handles the main watch loop until Ctrl-C
async fn handle_watch(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_http_client(&config.user_agent.value, config.monitor.fetch_timeout())?;
    let entries = load_sources(config, &client).await?;
    let notifier = build_notifier(&config.notify, client);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        tracing::info!("Received Ctrl-C, shutting down");
        shutdown.cancel();
    });

    match watch(config, &entries, notifier.as_ref(), &cancel).await {
        Ok(cycles) => {
            tracing::info!("Watch finished after {} check cycles", cycles);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Watch failed: {}", e);
            Err(e.into())
        }
    }
}
