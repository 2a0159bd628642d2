//! heatup - find people nearby who are looking for the same thing, and keep
//! the app shell available offline.

mod app;
mod console;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use heatup_core::location::{FixedLocation, LocationProvider, NoLocation};
use heatup_core::notify::{Capability, NotificationDispatcher, Permission};
use heatup_core::offline::{
    AssetRequest, CacheStorage, ClientRegistry, DiskCacheStorage, Fetcher, HttpFetcher,
    OfflineWorker, WorkerState,
};
use heatup_core::source::MockCandidateSource;
use heatup_core::utils::format_distance;
use heatup_core::{Category, Config, Position};

use app::{App, AppEvent, Command};
use console::{ConsoleChannel, ConsolePresenter, ConsoleRegistry, UnreachableNetwork};

/// Initialize the tracing subscriber for logging.
/// `RUST_LOG` controls the level; `HEATUP_LOG_DIR` adds a daily log file.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os("HEATUP_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "heatup.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

// ============================================================================
// Argument parsing
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "heatup", version)]
#[command(about = "Find people nearby looking for the same thing, with an offline app shell")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover nearby matches
    Scan(ScanArgs),

    /// Cache the offline app shell and activate it
    Install,

    /// Request an asset cache-first
    Fetch {
        /// Asset path, e.g. /index.html
        path: String,

        /// Answer from the cache only, never touching the network
        #[arg(long)]
        offline: bool,
    },

    /// List cached versions and their entries
    Status,

    /// Delete cache versions other than the configured one
    Prune,

    /// Print the active configuration
    Config,
}

#[derive(Debug, Default, PartialEq, Args)]
struct ScanArgs {
    /// Device latitude; without it the fallback position is used
    #[arg(long, env = "HEATUP_LAT", requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, env = "HEATUP_LON", requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Search radius in km
    #[arg(long = "radius", value_name = "KM")]
    radius_km: Option<f64>,

    /// Category to match (casual, events, friendship)
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,

    /// Seed for reproducible mock candidates
    #[arg(long)]
    seed: Option<u64>,

    /// Show the profile of a candidate after the scan
    #[arg(long, value_name = "ID")]
    open: Option<String>,

    /// Ping a candidate after the scan
    #[arg(long, value_name = "ID")]
    ping: Option<String>,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}

/// Location from flags or `HEATUP_LAT`/`HEATUP_LON`; none means the
/// fallback position will be used.
fn location_provider(args: &ScanArgs) -> Result<Arc<dyn LocationProvider>> {
    Ok(match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Arc::new(FixedLocation(Position::new(lat, lon)?)),
        _ => Arc::new(NoLocation),
    })
}

/// Notification capability from `HEATUP_NOTIFICATIONS`
/// (`granted`, `denied`, `default`, `unsupported`); granted when unset.
fn notification_capability() -> Capability {
    capability_from(std::env::var("HEATUP_NOTIFICATIONS").ok().as_deref())
}

fn capability_from(value: Option<&str>) -> Capability {
    match value {
        None | Some("granted") => Capability::Supported(Permission::Granted),
        Some("denied") => Capability::Supported(Permission::Denied),
        Some("default") => Capability::Supported(Permission::Default),
        Some("unsupported") => Capability::Unsupported,
        Some(other) => {
            warn!(value = other, "Unknown HEATUP_NOTIFICATIONS value, treating as unsupported");
            Capability::Unsupported
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn open_storage(config: &Config) -> Result<Arc<dyn CacheStorage>> {
    let dir = config.cache_dir()?;
    Ok(Arc::new(DiskCacheStorage::new(dir)?))
}

fn restore_worker(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<OfflineWorker> {
    let worker = OfflineWorker::restore(
        config.manifest(),
        open_storage(config)?,
        fetcher,
        ClientRegistry::new(),
    )?;
    Ok(worker.with_pruning(config.prune_stale_caches))
}

async fn run_scan(config: Config, scan_args: ScanArgs) -> Result<()> {

    // A background channel exists only while an offline version is active
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.asset_base_url)?);
    let channel = match restore_worker(&config, fetcher) {
        Ok(worker) if worker.state() == WorkerState::Activated => Some(Arc::new(ConsoleChannel::default())),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Could not inspect offline cache");
            None
        }
    };

    let notifier = NotificationDispatcher::new(
        notification_capability(),
        Arc::new(ConsoleRegistry::new(channel)),
        Arc::new(ConsolePresenter),
    )
    .with_lookup_timeout(config.notification_lookup_timeout());

    let source = Arc::new(match scan_args.seed {
        Some(seed) => MockCandidateSource::with_seed(config.candidates_per_scan, seed),
        None => MockCandidateSource::new(config.candidates_per_scan),
    });
    let location = location_provider(&scan_args)?;
    let mut app = App::new(config, source, location, notifier);

    if let AppEvent::Located(resolved) = app.handle(Command::Locate).await? {
        let note = if resolved.is_fallback() { " (fallback)" } else { "" };
        println!("Position: {}{}", resolved.position(), note);
    }
    if let Some(radius) = scan_args.radius_km {
        app.handle(Command::SetRadius(radius)).await?;
    }
    if let Some(category) = scan_args.category {
        app.handle(Command::SetCategory(category)).await?;
    }

    if let AppEvent::ScanCompleted { results, .. } = app.handle(Command::Scan).await? {
        println!(
            "{} match(es) within {}:",
            results.len(),
            format_distance(app.state.radius_km)
        );
        for r in &results {
            let c = &r.candidate;
            println!(
                "  {} {:<8} {:>3}  {:>9}  {} · {}",
                c.initial(),
                c.display_name,
                c.age,
                format_distance(r.distance_km),
                c.category,
                c.note
            );
        }
    }

    if let Some(id) = scan_args.open.clone() {
        if let AppEvent::Profile(text) = app.handle(Command::OpenProfile(id)).await? {
            println!("{}", text);
        }
    }
    if let Some(id) = scan_args.ping.clone() {
        if let AppEvent::Pinged { id, outcome } = app.handle(Command::Ping(id)).await? {
            info!(%id, ?outcome, "Pinged candidate");
        }
    }
    Ok(())
}

async fn run_install(config: &Config) -> Result<()> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.asset_base_url)?);
    let mut worker = OfflineWorker::new(config.manifest(), open_storage(config)?, fetcher, ClientRegistry::new())
        .with_pruning(config.prune_stale_caches);

    let installed = worker.install().await?;
    println!("Installed {} ({} assets)", installed.version, installed.cached);

    let activated = worker.activate().await?;
    println!("Activated {}", activated.version);
    for namespace in &activated.pruned {
        println!("  pruned {}", namespace);
    }
    Ok(())
}

async fn run_fetch(config: &Config, path: &str, offline: bool) -> Result<()> {
    let fetcher: Arc<dyn Fetcher> = if offline {
        Arc::new(UnreachableNetwork)
    } else {
        Arc::new(HttpFetcher::new(&config.asset_base_url)?)
    };
    let worker = restore_worker(config, fetcher)?;
    info!(state = %worker.state(), version = worker.version(), "Offline worker ready");

    let response = worker.handle_fetch(&AssetRequest::get(path)).await?;
    println!(
        "{} {} ({} bytes, {})",
        response.status,
        path,
        response.body.len(),
        response.content_type.as_deref().unwrap_or("unknown type")
    );
    Ok(())
}

fn run_status(config: &Config) -> Result<()> {
    let storage = open_storage(config)?;
    let namespaces = storage.namespaces()?;
    if namespaces.is_empty() {
        println!("No cached versions");
    }
    for namespace in namespaces {
        let marker = if namespace == config.cache_version { "*" } else { " " };
        println!("{} {}", marker, namespace);
        for entry in storage.entries(&namespace)? {
            println!("    {:<24} {:>8} bytes  {}", entry.key, entry.size, entry.age_display());
        }
    }
    Ok(())
}

fn run_prune(config: &Config) -> Result<()> {
    let worker = restore_worker(config, Arc::new(UnreachableNetwork))?;
    let pruned = worker.prune_stale_versions()?;
    if pruned.is_empty() {
        println!("Nothing to prune");
    }
    for namespace in pruned {
        println!("Pruned {}", namespace);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    match cli.command {
        Commands::Scan(args) => run_scan(config, args).await,
        Commands::Install => run_install(&config).await,
        Commands::Fetch { path, offline } => run_fetch(&config, &path, offline).await,
        Commands::Status => run_status(&config),
        Commands::Prune => run_prune(&config),
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(args: &[&str]) -> Result<ScanArgs, clap::Error> {
        let argv = ["heatup", "scan"].into_iter().chain(args.iter().copied());
        match Cli::try_parse_from(argv)?.command {
            Commands::Scan(args) => Ok(args),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_args() {
        let parsed = scan(&[
            "--lat", "45.0", "--lon", "25.0", "--radius", "12.5", "--category", "events", "--seed",
            "7", "--ping", "p3",
        ])
        .unwrap();

        assert_eq!(
            parsed,
            ScanArgs {
                lat: Some(45.0),
                lon: Some(25.0),
                radius_km: Some(12.5),
                category: Some(Category::Events),
                seed: Some(7),
                open: None,
                ping: Some("p3".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_scan_args_errors() {
        assert!(scan(&["--radius"]).is_err());
        assert!(scan(&["--radius", "far"]).is_err());
        assert!(scan(&["--category", "romance"]).is_err());
        assert!(scan(&["--verbose"]).is_err());
    }

    #[test]
    fn test_lat_requires_lon() {
        // Only meaningful when the environment does not supply the other half
        if std::env::var_os("HEATUP_LAT").is_none() && std::env::var_os("HEATUP_LON").is_none() {
            assert!(scan(&["--lat", "45.0"]).is_err());
            assert!(scan(&["--lon", "25.0"]).is_err());
        }
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from(["heatup", "fetch", "/index.html", "--offline"]).unwrap();
        match cli.command {
            Commands::Fetch { path, offline } => {
                assert_eq!(path, "/index.html");
                assert!(offline);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["heatup", "fetch"]).is_err());
        assert!(Cli::try_parse_from(["heatup", "teleport"]).is_err());
    }

    #[test]
    fn test_location_from_flags_is_validated() {
        let bad = ScanArgs {
            lat: Some(95.0),
            lon: Some(25.0),
            ..Default::default()
        };
        assert!(location_provider(&bad).is_err());
    }

    #[test]
    fn test_notification_capability_values() {
        assert_eq!(capability_from(None), Capability::Supported(Permission::Granted));
        assert_eq!(capability_from(Some("granted")), Capability::Supported(Permission::Granted));
        assert_eq!(capability_from(Some("denied")), Capability::Supported(Permission::Denied));
        assert_eq!(capability_from(Some("default")), Capability::Supported(Permission::Default));
        assert_eq!(capability_from(Some("unsupported")), Capability::Unsupported);
        assert_eq!(capability_from(Some("denyed")), Capability::Unsupported);
    }
}
