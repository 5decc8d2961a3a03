//! dirmap main entry point
//!
//! This is the command-line interface for the dirmap directory-index crawler.

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use dirmap::config::{
    load_config_or_default, load_or_create_config, Config, ConfigOverrides, LoggingConfig,
};
use dirmap::crawler::crawl;
use dirmap::output::{load_statistics, print_statistics, print_tree_statistics, save_tree};
use dirmap::DirmapError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Exit status used when the crawl is interrupted with Ctrl+C
const EXIT_INTERRUPTED: i32 = 130;

/// dirmap: a directory-index tree mapper
///
/// dirmap crawls auto-generated HTTP directory listings (Apache, nginx and
/// similar), rebuilds the folder/file hierarchy and exports it as JSON.
#[derive(Parser, Debug)]
#[command(name = "dirmap")]
#[command(version)]
#[command(about = "Map the folder tree behind an HTTP directory index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file (`crawl` creates it with defaults if missing)
    #[arg(short, long, global = true, default_value = "dirmap.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the directory index and export the tree
    Crawl(CrawlArgs),

    /// Show counts from a previously exported tree
    Stats {
        /// Tree JSON file (defaults to output.tree-path)
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Root URL of the directory index
    #[arg(long)]
    url: Option<String>,

    /// Where to write the tree JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Concurrent subfolder crawls per folder
    #[arg(long, value_name = "N")]
    threads: Option<u32>,

    /// Retries per request after the first attempt
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Crawl subfolders one at a time
    #[arg(long)]
    sequential: bool,
}

impl CrawlArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.url.clone(),
            tree_path: self.json.as_ref().map(|p| p.display().to_string()),
            max_concurrency: self.threads,
            max_retries: self.retries,
            timeout_secs: self.timeout,
            sequential: self.sequential,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `stats` only reads, so it never writes a default config file
    let (mut config, created) = match &cli.command {
        Command::Crawl(_) => load_or_create_config(&cli.config),
        Command::Stats { .. } => load_config_or_default(&cli.config).map(|c| (c, false)),
    }
    .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if let Command::Crawl(args) = &cli.command {
        config
            .apply_overrides(&args.overrides())
            .context("Invalid command-line option")?;
    }

    let log_to_file = matches!(cli.command, Command::Crawl(_));
    let _log_guard = setup_logging(&config.logging, log_to_file, cli.verbose, cli.quiet);

    if created {
        tracing::info!("Created default configuration at {}", cli.config.display());
    } else {
        tracing::info!("Configuration loaded from {}", cli.config.display());
    }

    match cli.command {
        Command::Crawl(_) => handle_crawl(config).await,
        Command::Stats { json } => {
            let path = json.unwrap_or_else(|| PathBuf::from(&config.output.tree_path));
            handle_stats(&path)
        }
    }
}

/// Console filter: `-q` shows errors only; otherwise each `-v` raises
/// verbosity one step above the configured level
fn console_filter(level: &str, verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new(format!("dirmap={},warn", level)),
            1 => EnvFilter::new("dirmap=debug,info"),
            2 => EnvFilter::new("dirmap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// Console output follows the verbosity flags. When `to_file` is set and
/// `logging.log-dir` is not empty, a per-run debug log is written there too;
/// the returned guard flushes it on drop.
fn setup_logging(
    logging: &LoggingConfig,
    to_file: bool,
    verbose: u8,
    quiet: bool,
) -> Option<WorkerGuard> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter(&logging.level, verbose, quiet));

    let mut guard = None;
    let mut opened = None;
    let mut failure = None;

    let file = if to_file && !logging.log_dir.is_empty() {
        match open_log_file(Path::new(&logging.log_dir), Local::now()) {
            Ok((writer, file_guard, path)) => {
                guard = Some(file_guard);
                opened = Some(path);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_thread_names(true)
                        .with_filter(EnvFilter::new("dirmap=debug,warn")),
                )
            }
            Err(e) => {
                failure = Some(e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry().with(console).with(file).init();

    if let Some(path) = opened {
        tracing::info!("Logging to {}", path.display());
    }
    if let Some(e) = failure {
        tracing::warn!("File logging disabled: {:#}", e);
    }

    guard
}

/// Name of the per-run log file, e.g. `dirmap_20240115_143000.log`
fn log_file_name(started: DateTime<Local>) -> String {
    format!("dirmap_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Opens a non-blocking writer for a new log file in `dir`
fn open_log_file(
    dir: &Path,
    started: DateTime<Local>,
) -> anyhow::Result<(NonBlocking, WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let name = log_file_name(started);
    let prefix = name.trim_end_matches(".log");
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, guard, dir.join(name)))
}

/// Sets the returned flag on the first Ctrl+C
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, finishing in-flight folders");
                flag.store(true, Ordering::SeqCst);
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    interrupted
}

/// Handles the `crawl` command: crawls, exports the tree and prints statistics
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Base URL: {}", config.crawler.base_url);
    tracing::info!("Tree output: {}", config.output.tree_path);

    let interrupted = install_interrupt_handler();

    let report = match crawl(&config, interrupted).await {
        Ok(report) => report,
        Err(DirmapError::Interrupted) => {
            eprintln!("Crawl interrupted by user");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let tree_path = Path::new(&config.output.tree_path);
    save_tree(&report.tree, tree_path)
        .with_context(|| format!("Failed to write tree to {}", tree_path.display()))?;

    println!();
    print_statistics(&report.stats, report.elapsed);
    println!("\nTree written to {}", tree_path.display());

    if report.stats.errors_encountered > 0 {
        tracing::warn!(
            "{} folders could not be listed; they are marked with an error in the tree",
            report.stats.errors_encountered
        );
    }

    Ok(())
}

/// Handles the `stats` command: prints counts from an exported tree
fn handle_stats(path: &Path) -> anyhow::Result<()> {
    let stats = load_statistics(path)
        .with_context(|| format!("Failed to read tree from {}", path.display()))?;

    print_tree_statistics(&stats);
    Ok(())
}
