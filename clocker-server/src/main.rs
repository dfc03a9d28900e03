//! clocker-server - personal work time tracker
//!
//! Serves the calendar API, the statistics and the web pages from a single
//! SQLite database in the root folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clocker_common::config::{
    default_config_path, load_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig,
};
use clocker_common::db::init_database;
use clocker_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "clocker-server")]
#[command(about = "Work time tracker with labor compliance checks")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "CLOCKER_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(short, long, env = "CLOCKER_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (filter, filter_handle) = reload::Layer::new(log_filter("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clocker-server v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(default_config_path);
    let config = load_config(config_path.as_deref(), &filter_handle)?;

    let defaults = CompiledDefaults::for_current_platform();
    let holiday_state = config
        .holiday_state()
        .context("Invalid holiday_state in configuration")?;

    let root_folder = RootFolderResolver::new()
        .with_cli_override(args.root_folder)
        .with_toml_config(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    if !initializer.database_exists() {
        info!("Creating new database at {}", db_path.display());
    }
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database: {}", db_path.display());
    info!("Public holidays: {}", holiday_state);

    let state = AppState::new(pool, holiday_state, config.statistics.clone());
    let app = build_router(state);

    let host = args.host.or(config.host).unwrap_or(defaults.host);
    let port = args.port.or(config.port).unwrap_or(defaults.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("clocker-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("clocker-server stopped");
    Ok(())
}

/// Load the configuration and switch logging to its level
fn load_config(
    path: Option<&Path>,
    filter: &reload::Handle<EnvFilter, Registry>,
) -> Result<TomlConfig> {
    let config = match path {
        Some(path) => load_toml_config(path).context("Failed to load configuration")?,
        None => TomlConfig::default(),
    };
    filter
        .reload(log_filter(&config.logging.level))
        .context("Failed to apply configured log level")?;

    if let Some(path) = path {
        info!("Config file: {}", path.display());
    }
    Ok(config)
}

/// `RUST_LOG` when set, otherwise `level` for the clocker crates
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clocker_server={level},clocker_common={level},tower_http=info").into()
    })
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
