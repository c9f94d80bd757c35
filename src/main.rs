//! Market Harvester main entry point
//!
//! Command-line interface for the marketplace product crawler.

use clap::Parser;
use market_harvester::config::load_config_with_hash;
use market_harvester::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Market Harvester: a marketplace product crawler
///
/// Expands seed keywords through the marketplace's autosuggest endpoint,
/// paginates search results, and extracts structured product records with
/// their images.
#[derive(Parser, Debug)]
#[command(name = "market-harvester")]
#[command(version)]
#[command(about = "A marketplace product crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

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

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("market_harvester=info,warn"),
            1 => EnvFilter::new("market_harvester=debug,info"),
            2 => EnvFilter::new("market_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &market_harvester::config::Config, config_hash: &str) {
    println!("=== Market Harvester Dry Run ===\n");
    println!("Config hash: {}", config_hash);

    println!("\nSearch:");
    println!("  Seed keywords ({}):", config.search.keywords.len());
    for keyword in &config.search.keywords {
        println!("    - {}", keyword);
    }
    println!("  Use suggestions: {}", config.search.use_suggestions);
    println!(
        "  Allowed categories: {}",
        config.search.allowed_categories.join(", ")
    );
    println!(
        "  Max pages per keyword: {}",
        config.search.max_pages_per_keyword
    );
    println!("  Results per page: {}", config.search.results_per_page);

    println!("\nEndpoints:");
    println!("  Search: {}", config.endpoints.search_base_url);
    println!("  Suggestions: {}", config.endpoints.suggestion_base_url);

    println!("\nNetwork:");
    println!("  User agent: {}", config.network.user_agent);
    println!(
        "  Max concurrent fetches: {}",
        config.network.max_concurrent_fetches
    );
    match &config.network.proxy_url {
        Some(proxy) => println!("  Proxy: {}", proxy),
        None => println!("  Proxy: none"),
    }

    println!("\nRendering:");
    if config.rendering.enabled {
        println!("  WebDriver: {}", config.rendering.webdriver_url);
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Images: {}", config.output.images_dir);
    println!("  Download images: {}", config.output.download_images);
    println!("  Debug artifacts: {}", config.output.debug_dir);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} seed keyword(s) across {} categor(ies)",
        config.search.keywords.len(),
        config.search.allowed_categories.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: market_harvester::config::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl: {} seed keyword(s), suggestions {}",
        config.search.keywords.len(),
        if config.search.use_suggestions {
            "enabled"
        } else {
            "disabled"
        }
    );

    match crawl(config).await {
        Ok(totals) => {
            tracing::info!(
                "Crawl completed: {} records emitted, {} search pages fetched",
                totals.records_emitted,
                totals.search_pages_fetched
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
