//! usbids CLI - look up USB vendor and device names

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use usbids::config::{self, UsbIdsConfig};
use usbids::storage::SqliteStore;
use usbids::ui::{self, Icons, Spinner};
use usbids::{HttpFetcher, LookupService, RefreshOutcome, Refresher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "usbids")]
#[command(version)]
#[command(about = "Look up USB vendor and device names from a local copy of the usb.ids registry")]
#[command(long_about = r#"
usbids keeps a local SQLite copy of the USB ID registry and resolves
vendor and device ids to names. The copy is refreshed automatically when
it is older than the configured maximum age.

Example usage:
  usbids lookup 1d6b
  usbids lookup 1d6b 0002
  usbids devices 8086
  usbids interactive
  usbids update
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: ./usbids.toml if present)
    #[arg(short, long, global = true, env = "USBIDS_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(long, global = true, env = "USBIDS_DB")]
    database: Option<PathBuf>,

    /// Location of the usb.ids document
    #[arg(long, global = true, env = "USBIDS_SOURCE_URL")]
    source_url: Option<String>,

    /// Refresh the cache when it is older than this many days
    #[arg(long, global = true, env = "USBIDS_MAX_AGE_DAYS")]
    max_age_days: Option<u32>,

    /// Never refresh; use the cached registry as is
    #[arg(long, global = true)]
    offline: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a vendor, or a device under its vendor
    Lookup {
        /// VENDOR [DEVICE] as hex ids
        #[arg(value_name = "ID", num_args = 0..=2)]
        ids: Vec<String>,

        /// Vendor id (alternative to the first positional id)
        #[arg(long, conflicts_with = "ids")]
        vendor: Option<String>,

        /// Device id; requires a vendor id
        #[arg(short, long)]
        device: Option<String>,
    },

    /// List every device registered under a vendor
    Devices {
        /// Vendor id (hex)
        vendor: String,
    },

    /// Prompt for ids until 'q' or end of input
    Interactive,

    /// Download and re-ingest the registry now
    Update,

    /// Show statistics about the cached registry
    Stats,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { force } = cli.command {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        config::write_config(&path, &UsbIdsConfig::with_defaults(), force)?;
        ui::success(&format!("Wrote {}", path.display()));
        return Ok(());
    }

    let settings = resolve_settings(&cli)?;
    let db_path = settings.db_path();
    config::ensure_db_dir(&db_path)?;
    let mut store = SqliteStore::open(&db_path)?;
    tracing::debug!("Using database {}", db_path.display());

    match cli.command {
        Commands::Lookup { ids, vendor, device } => {
            ensure_fresh(&mut store, &settings, cli.offline)?;
            let vendor = vendor.or_else(|| ids.first().cloned());
            let device = device.or_else(|| ids.get(1).cloned());

            let service = LookupService::new(&store);
            let outcome = service.lookup(vendor.as_deref(), device.as_deref())?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Text => ui::lookup_result(&outcome),
            }
        }

        Commands::Devices { vendor } => {
            ensure_fresh(&mut store, &settings, cli.offline)?;
            let service = LookupService::new(&store);
            let listing = service.vendor_devices(&vendor)?;

            match (cli.format, listing) {
                (OutputFormat::Json, Some(listing)) => {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                }
                (OutputFormat::Json, None) => {
                    let data = serde_json::json!({ "status": "vendor_not_found", "vendor_id": vendor.trim() });
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                (OutputFormat::Text, Some(listing)) => ui::listing(&listing),
                (OutputFormat::Text, None) => println!("{} Vendor {} not found", Icons::CROSS, vendor.trim()),
            }
        }

        Commands::Interactive => {
            ensure_fresh(&mut store, &settings, cli.offline)?;
            let service = LookupService::new(&store);
            let stdin = std::io::stdin();
            let summary = usbids::interactive::run(&service, stdin.lock(), std::io::stdout())?;
            tracing::debug!(
                queries = summary.queries,
                invalid = summary.invalid,
                not_found = summary.not_found,
                "Interactive session ended"
            );
        }

        Commands::Update => {
            let fetcher = HttpFetcher::new(settings.source_url(), settings.timeout(), settings.retries())?;
            let spinner = Spinner::new(&format!("Downloading {}", settings.source_url()));
            let result = Refresher::new(&mut store, &fetcher, settings.max_age()).force_refresh(chrono::Utc::now());
            spinner.finish_and_clear();
            let report = result?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => {
                    ui::success("Registry updated");
                    ui::summary_row("Vendors:", &report.vendors.to_string());
                    ui::summary_row("Devices:", &report.devices.to_string());
                    if report.warnings > 0 {
                        ui::summary_row("Skipped lines:", &report.warnings.to_string());
                    }
                    ui::summary_row("Source:", &report.source);
                }
            }
        }

        Commands::Stats => {
            let stats = store.stats()?;
            let now = chrono::Utc::now();
            let stale = usbids::should_refresh(stats.last_updated, now, settings.max_age());

            match cli.format {
                OutputFormat::Json => {
                    let data = serde_json::json!({
                        "database": db_path,
                        "stats": stats,
                        "stale": stale,
                    });
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                OutputFormat::Text => {
                    ui::header(&format!("usbids Statistics ({})", db_path.display()));
                    let last_updated = match stats.last_updated {
                        Some(ts) => format!("{} ({} days ago)", ts.format("%Y-%m-%d %H:%M UTC"), (now - ts).num_days()),
                        None => "never".to_string(),
                    };
                    println!(
                        "{}",
                        ui::stats_table(&[
                            ("Vendors", stats.vendors.to_string()),
                            ("Devices", stats.devices.to_string()),
                            ("Last updated", last_updated),
                            ("Source", stats.source.clone().unwrap_or_else(|| "-".to_string())),
                            ("Refresh due", if stale { "yes" } else { "no" }.to_string()),
                        ])
                    );
                }
            }
        }

        Commands::Init { .. } => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

/// Config file values overridden by flags and environment variables
fn resolve_settings(cli: &Cli) -> anyhow::Result<UsbIdsConfig> {
    let mut settings = config::load_config(cli.config.as_deref())?;
    if let Some(db) = &cli.database {
        settings.db_path = Some(db.clone());
    }
    if let Some(url) = &cli.source_url {
        settings.source_url = Some(url.clone());
    }
    if let Some(days) = cli.max_age_days {
        settings.max_age_days = Some(days);
    }
    Ok(settings)
}

/// Apply the refresh policy before serving lookups.
///
/// A failed refresh with cached data only warns; without cached data it is fatal.
fn ensure_fresh(store: &mut SqliteStore, settings: &UsbIdsConfig, offline: bool) -> anyhow::Result<()> {
    if offline {
        if !store.is_populated()? {
            anyhow::bail!("no cached registry yet; run `usbids update` or drop --offline");
        }
        return Ok(());
    }

    let now = chrono::Utc::now();
    if !usbids::should_refresh(store.last_updated()?, now, settings.max_age()) {
        return Ok(());
    }

    let fetcher = HttpFetcher::new(settings.source_url(), settings.timeout(), settings.retries())?;
    let spinner = Spinner::new(&format!("{} Refreshing USB id registry", Icons::DOWN));
    let outcome = Refresher::new(store, &fetcher, settings.max_age()).refresh_if_stale(now);
    spinner.finish_and_clear();

    match outcome? {
        RefreshOutcome::UpToDate { .. } => {}
        RefreshOutcome::Refreshed(report) => {
            tracing::debug!("Refreshed: {}", report);
        }
        RefreshOutcome::Degraded { last_updated, error } => {
            ui::degraded(&last_updated.format("%Y-%m-%d %H:%M UTC").to_string(), &error.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_accepts_positional_or_flag_ids() {
        let cli = Cli::try_parse_from(["usbids", "lookup", "1d6b", "0002"]).unwrap();
        assert!(matches!(cli.command, Commands::Lookup { ref ids, vendor: None, .. } if ids.len() == 2));

        let cli = Cli::try_parse_from(["usbids", "lookup", "--vendor", "1d6b", "-d", "0002"]).unwrap();
        assert!(matches!(cli.command, Commands::Lookup { ref ids, vendor: Some(_), device: Some(_) } if ids.is_empty()));
    }

    #[test]
    fn test_vendor_flag_conflicts_with_positional_ids() {
        let err = Cli::try_parse_from(["usbids", "lookup", "--vendor", "1d6b", "046d"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
