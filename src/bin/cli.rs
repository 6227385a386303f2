//! Stockwatch CLI
//!
//! Local execution entry point for the Shein India stock monitor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stockwatch::{
    error::Result,
    models::Config,
    pipeline,
    services::{ConsoleNotifier, Notifier, SheinScraper, TelegramNotifier},
    storage::{LocalStateStore, StateStorage},
};

/// Stockwatch - Shein India stock monitor
#[derive(Parser, Debug)]
#[command(
    name = "stockwatch",
    version,
    about = "Watches Shein India listings for restocks, new sizes and new products"
)]
struct Cli {
    /// Path to storage directory containing config and state files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll listings forever on the configured interval
    Watch {
        /// Print notifications to stdout instead of sending to Telegram
        #[arg(long)]
        dry_run: bool,
    },

    /// Run exactly one poll cycle, then exit
    Once {
        /// Print notifications to stdout instead of sending to Telegram
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show persisted state info
    Info,

    /// Send a test message through the Telegram notifier
    TestNotify {
        /// Message text to send
        #[arg(long, default_value = "stockwatch test message")]
        text: String,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_notifier(config: &Config, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(ConsoleNotifier));
    }
    let notifier = TelegramNotifier::new(&config.telegram)?;
    if !notifier.is_configured() {
        log::warn!("Telegram is not configured; notifications will be logged and skipped");
    }
    Ok(Box::new(notifier))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let storage = LocalStateStore::new(&cli.storage_dir);

    match cli.command {
        Command::Watch { dry_run } => {
            config.validate()?;
            log::info!("Stockwatch starting...");

            let scraper = SheinScraper::new(&config.scraper)?;
            let notifier = build_notifier(&config, dry_run)?;
            pipeline::run_monitor(&config, &scraper, notifier.as_ref(), &storage).await?;
        }

        Command::Once { dry_run } => {
            config.validate()?;

            let scraper = SheinScraper::new(&config.scraper)?;
            let notifier = build_notifier(&config, dry_run)?;
            let stats =
                pipeline::run_once(&config, &scraper, notifier.as_ref(), &storage).await?;

            log::info!(
                "Checked {} products across {} listings, sent {} messages",
                stats.products_checked,
                stats.listings_scanned,
                stats.messages_sent
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} listing URLs)", config.urls.len());
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let state = storage.load().await?;
            log::info!("Tracked products: {}", state.products.len());
            log::info!("Tracked listings: {}", state.listings.len());
            match state.updated_at {
                Some(at) => log::info!("Last updated: {}", at),
                None => log::info!("No saved state yet."),
            }
        }

        Command::TestNotify { text } => {
            let notifier = TelegramNotifier::new(&config.telegram)?;
            if !notifier.is_configured() {
                log::warn!("Telegram is not configured; nothing will be delivered");
            }
            notifier.send(&text).await?;
            log::info!("Test message dispatched");
        }
    }

    Ok(())
}
