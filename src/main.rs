//! Sitemap-Resolver main entry point
//!
//! This is the command-line interface for the Sitemap-Resolver.

use clap::Parser;
use sitemap_resolver::config::{load_config_with_hash, Config};
use sitemap_resolver::crawler::Coordinator;
use sitemap_resolver::output::{load_statistics, print_statistics};
use sitemap_resolver::storage::SqliteStorage;
use sitemap_resolver::ResolutionGuard;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sitemap-Resolver: sitemap discovery for a polite crawler
///
/// Resolves the sitemaps of every seed's site root exactly once, following
/// sitemap indexes and robots.txt directives, and records the announced
/// URLs in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "sitemap-resolver")]
#[command(version = "1.0.0")]
#[command(about = "Resolves site sitemaps for a crawl frontier", long_about = None)]
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

    /// Forget previously resolved roots and resolve everything again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be resolved without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
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

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_resolve(config, cli.fresh)?;
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
            0 => EnvFilter::new("sitemap_resolver=info,warn"),
            1 => EnvFilter::new("sitemap_resolver=debug,info"),
            2 => EnvFilter::new("sitemap_resolver=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be resolved
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let plans = sitemap_resolver::crawler::plan_roots(&config.seeds)?;

    println!("=== Sitemap-Resolver Dry Run ===\n");

    println!("Sitemap Configuration:");
    println!("  Paths: {}", config.sitemap.paths.join(", "));
    println!(
        "  Scope: {}",
        if config.sitemap.lenient { "lenient" } else { "strict" }
    );
    match &config.sitemap.temp_dir {
        Some(dir) => println!("  Temp dir: {}", dir.display()),
        None => println!("  Temp dir: {} (system)", std::env::temp_dir().display()),
    }

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Read robots.txt: {}", config.crawler.robots);

    println!("\nUser Agent:");
    println!(
        "  {}",
        sitemap_resolver::crawler::user_agent(&config.user_agent)
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nRoots ({}):", plans.len());
    for plan in &plans {
        if plan.is_start_urls {
            println!("  - {} (start-URL sitemaps only)", plan.root);
            for sitemap in &plan.sitemaps {
                println!("    * {}", sitemap);
            }
        } else {
            println!("  - {}", plan.root);
            for path in &config.sitemap.paths {
                println!("    * {}", plan.root.join_path(path));
            }
            if config.crawler.robots {
                println!("    * Sitemap: directives of {}", plan.root.join_path("/robots.txt"));
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would resolve {} roots from {} seeds",
        plans.len(),
        config.seeds.len()
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main resolution run
fn handle_resolve(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh run (forgetting resolved roots)");
    }
    tracing::info!("Total seed URLs: {}", config.seeds.len());

    let coordinator = Coordinator::new(config, fresh)?;
    watch_for_interrupt(coordinator.stop_handle());

    match coordinator.run() {
        Ok(summary) => {
            if summary.interrupted {
                tracing::warn!("Run interrupted; unfinished roots will be resolved next time");
            } else {
                tracing::info!("Run completed successfully");
                let stats = load_statistics(coordinator.storage())?;
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Stops resolution on Ctrl-C
///
/// The resolver is blocking, so the signal is awaited on a side thread with
/// its own single-threaded runtime.
fn watch_for_interrupt(guard: Arc<ResolutionGuard>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                return;
            }
        };

        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("Interrupt received, stopping after current locations");
                    guard.shutdown();
                }
                Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {}", e),
            }
        });
    });
}
