//! Catalog Harvest main entry point
//!
//! This is the command-line interface for the catalog harvester.

use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::crawler::Coordinator;
use catalog_harvest::output::print_summary;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog Harvest: a polite storefront catalog harvester
///
/// Walks the catalog's categories and listing pages, fetches every product
/// page and writes name, SKU and price of each product to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite storefront catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the CSV file here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::new(config.clone())?;

    println!("=== Catalog Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Catalog: {}", coordinator.catalog_url()?);
    println!("  Page parameter: {}", config.site.page_param);

    println!("\nRequests:");
    println!("  Timeout: {}s", config.request.timeout_secs);
    for (name, value) in &config.request.headers {
        println!("  {}: {}", name, value);
    }

    let politeness = &config.politeness;
    println!("\nPoliteness:");
    println!(
        "  Pacing: {}-{}ms before every request",
        politeness.pacing_min_ms, politeness.pacing_max_ms
    );
    println!("  Cooldown after failure: {}ms", politeness.cooldown_ms);
    println!(
        "  Listing task delay: {}-{}ms",
        politeness.listing_delay_min_ms, politeness.listing_delay_max_ms
    );
    println!(
        "  Detail task delay: {}-{}ms",
        politeness.detail_delay_min_ms, politeness.detail_delay_max_ms
    );
    println!("  Max attempts per URL: {}", config.retry.max_attempts);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );

    println!(
        "  Page count ceiling: {}",
        config.crawler.page_count_ceiling
    );

    let scope = &config.scope;
    println!("\nScope:");
    println!("  Categories: {}", describe_limit(scope.max_categories));
    println!(
        "  Pages per category: {}",
        describe_limit(scope.max_pages_per_category.map(|n| n as usize))
    );
    println!("  Products: {}", describe_limit(scope.max_products));
    println!("  Deduplicate links: {}", scope.dedupe_links);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

fn describe_limit(limit: Option<usize>) -> String {
    limit.map_or_else(|| "all".to_string(), |n| n.to_string())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting harvest of {}", config.site.base_url);

    let coordinator = Coordinator::new(config)?;
    match coordinator.run_and_persist().await {
        Ok(summary) => {
            tracing::info!("Harvest completed successfully");
            if !quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
