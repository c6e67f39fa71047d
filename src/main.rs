//! Lorebox main entry point
//!
//! This is the command-line interface for the Lorebox knowledge base builder.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lorebox::aggregate::{run_aggregation, run_drop_table, AggregationReport};
use lorebox::config::{load_config_with_hash, Config};
use lorebox::extract::{load_titles, run_extraction};
use lorebox::output::{load_status, print_status};
use lorebox::storage::open_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lorebox: a game-reference knowledge base builder
///
/// Lorebox harvests quest markup from a wiki without re-fetching what is
/// already stored, and joins the item and monster datasets into a
/// cross-referenced JSON knowledge base.
#[derive(Parser, Debug)]
#[command(name = "lorebox")]
#[command(version = "1.0.0")]
#[command(about = "A game-reference knowledge base builder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch markup for every queued title that has no record yet
    Extract {
        /// Only process titles in the retry list
        #[arg(long)]
        retry_only: bool,
    },

    /// Write every knowledge-base file
    Aggregate {
        /// Write everything except the item drop table
        #[arg(long)]
        skip_drop_table: bool,
    },

    /// Write only the item drop table
    DropTable,

    /// Show extraction progress and the retry list
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Extract { retry_only } => handle_extract(&config, retry_only).await,
        Command::Aggregate { skip_drop_table } => {
            let report = run_aggregation(&config, skip_drop_table)
                .await
                .context("Aggregation failed")?;
            print_report(&report);
            Ok(())
        }
        Command::DropTable => {
            let report = run_drop_table(&config)
                .await
                .context("Drop table generation failed")?;
            print_report(&report);
            Ok(())
        }
        Command::Status => handle_status(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lorebox=info,warn"),
            1 => EnvFilter::new("lorebox=debug,info"),
            2 => EnvFilter::new("lorebox=trace,debug"),
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

/// Handles the extract command
async fn handle_extract(config: &Config, retry_only: bool) -> anyhow::Result<()> {
    if retry_only {
        tracing::info!("Retrying failed titles only");
    } else {
        tracing::info!(
            "Extracting titles from {}",
            config.extraction.titles_path.display()
        );
    }

    let report = run_extraction(config, retry_only)
        .await
        .context("Extraction failed")?;

    if report.failed > 0 {
        tracing::warn!(
            "{} titles failed and were added to the retry list; rerun with --retry-only",
            report.failed
        );
    }

    Ok(())
}

/// Handles the status command
fn handle_status(config: &Config) -> anyhow::Result<()> {
    let titles = load_titles(&config.extraction.titles_path)?;
    let store = open_store(&config.extraction).context("Failed to open the record store")?;

    let status = load_status(&titles, store.as_ref())?;
    print_status(&status);

    Ok(())
}

fn print_report(report: &AggregationReport) {
    println!("=== Aggregation Summary ===\n");
    println!("  Items: {}", report.items);
    println!("  Monsters: {}", report.monsters);
    println!("  Prayers: {}", report.prayers);
    if let Some(count) = report.drop_table_items {
        println!("  Drop table items: {}", count);
    }
    println!();
    for path in &report.files {
        println!("✓ {}", path.display());
    }
}
