//! Chaban bridge closure sync CLI
//!
//! Local execution entry point. For AWS Lambda, use `chaban-sync-lambda`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chaban_sync::{
    error::Result,
    models::Config,
    pipeline::{self, VesselPassageState},
    services::{
        CalendarBackend, DryRunCalendar, GoogleCalendar, OpenDataClient, RecordSource,
        token_provider,
    },
    storage::{BlobStore, LocalStorage},
    utils::{http, truncate},
};
use clap::{Parser, Subcommand};
use reqwest::Client;

/// chaban-sync - Pont Chaban-Delmas closure calendar
#[derive(Parser, Debug)]
#[command(
    name = "chaban-sync",
    version,
    about = "Publishes Pont Chaban-Delmas closure forecasts to a calendar"
)]
struct Cli {
    /// Path to the config file; the token file is resolved next to it
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the calendar contents with the current closures
    Sync {
        /// Log the events instead of touching the calendar
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the events the current feed would produce, as JSON
    Preview,

    /// Delete every event in the calendar
    Clear,

    /// List the events currently in the calendar
    List,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn storage_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn google_calendar(
    config: &Config,
    storage: Arc<dyn BlobStore>,
    client: Client,
) -> Result<GoogleCalendar> {
    let tokens = token_provider(storage, &config.auth, client.clone());
    GoogleCalendar::new(client, &config.calendar, tokens)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", cli.config.display());
        let mut config = Config::load(&cli.config)?;
        config.apply_env_overrides();
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK (calendar {})", config.calendar.calendar_id);
        return Ok(());
    }

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env_overrides();
    config.validate()?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let storage: Arc<dyn BlobStore> = Arc::new(LocalStorage::new(storage_root(&cli.config)));
    let client = http::create_client(&config.http)?;
    let source = OpenDataClient::new(client.clone(), config.feed.clone());

    match cli.command {
        Command::Sync { dry_run } => {
            let report = if dry_run {
                let calendar = DryRunCalendar::new();
                pipeline::run_sync(&config, &source, &calendar).await?
            } else {
                let calendar = google_calendar(&config, storage, client)?;
                pipeline::run_sync(&config, &source, &calendar).await?
            };

            if !report.in_transit.is_empty() {
                log::info!("Vessels still in transit: {}", report.in_transit.join(", "));
            }
        }

        Command::Preview => {
            let records = source.fetch_records().await?;
            let mut state = VesselPassageState::new();
            let events = pipeline::transform(&records, &mut state).collect::<Result<Vec<_>>>()?;

            println!("{}", serde_json::to_string_pretty(&events)?);
            log::info!(
                "{} record(s) -> {} event(s)",
                records.len(),
                events.len()
            );
        }

        Command::Clear => {
            let calendar = google_calendar(&config, storage, client)?;
            let deleted =
                pipeline::clear_calendar(&calendar, config.calendar.max_concurrent_deletes)
                    .await?;
            log::info!("Deleted {} event(s)", deleted);
        }

        Command::List => {
            let calendar = google_calendar(&config, storage, client)?;
            let events = calendar.list_events().await?;
            for event in &events {
                println!(
                    "{}\t{}",
                    event.id,
                    truncate(event.summary.as_deref().unwrap_or("-"), 100)
                );
            }
            log::info!(
                "{} event(s) in {}",
                events.len(),
                calendar.calendar_id()
            );
        }

        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
