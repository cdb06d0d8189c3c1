//! tvbook-api - TV operations booking workflow service
//!
//! Serves the booking forms' REST backend. Configuration resolves from
//! command line, environment, TOML file and built-in defaults, in that order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tvbook_api::{build_router, db, AppState};
use tvbook_common::config::{load_toml_config, CliOverrides, ServiceConfig, ENV_DATA_FOLDER};
use tvbook_common::events::EventBus;

/// Command-line arguments for tvbook-api
#[derive(Parser, Debug)]
#[command(name = "tvbook-api")]
#[command(about = "Booking workflow service for TV operations")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/tvbook/config.toml, then /etc/tvbook/config.toml)
    #[arg(short, long, env = "TVBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long, env = ENV_DATA_FOLDER)]
    data_folder: Option<PathBuf>,

    /// Database file (default: <data folder>/tvbook.db)
    #[arg(long, env = "TVBOOK_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TVBOOK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TVBOOK_PORT")]
    port: Option<u16>,

    /// Load demo requests when the database is empty
    #[arg(long)]
    seed_demo: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TVBOOK_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            data_folder: self.data_folder.clone(),
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            seed_demo: self.seed_demo,
            log_level: self.log_level.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    let default_filter = format!("tvbook_api={level},tvbook_common={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The config file can set the log level, so read it before tracing is up
    let toml_config = load_toml_config(args.config.as_deref());
    let config = ServiceConfig::resolve(
        &args.overrides(),
        toml_config.as_ref().ok().and_then(|c| c.as_ref()),
    );

    init_tracing(&config.log_level);

    // Build identification first, before any slow startup work
    info!(
        "Starting tvbook-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Err(e) = toml_config {
        if args.config.is_some() {
            return Err(e).context("Failed to load config file");
        }
        warn!("Ignoring unreadable config file: {}", e);
    }

    config
        .ensure_directories()
        .context("Failed to create data folder")?;
    info!("Database path: {}", config.database_path.display());

    let pool = db::connect(&config.database_path)
        .await
        .context("Failed to open database")?;

    if config.seed_demo && db::seed_demo(&pool).await.context("Failed to seed demo data")? {
        info!("Demo data loaded");
    }

    let events = EventBus::new(config.event_capacity);
    let app = build_router(AppState::new(pool.clone(), events));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tvbook-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
