//! ahan-hub - AhanHub catalog service
//!
//! Serves the recitation, media, radio and TV catalog over HTTP and hosts the
//! admin editors. Startup seeds empty collections from the bundled dataset.

use ahan_common::config::{resolve_root_folder, StoreBackend, TomlConfig, DATABASE_FILE};
use ahan_common::db::init_database;
use ahan_common::store::{CatalogStores, MemoryStore, SqliteStore};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ahan_hub::catalog::Catalog;
use ahan_hub::defaults::DefaultDataset;
use ahan_hub::seed::bootstrap;
use ahan_hub::session::{ConfiguredCredentials, SessionStore};
use ahan_hub::summary::DisabledTextGenerator;
use ahan_hub::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "ahan-hub")]
#[command(about = "AhanHub catalog service")]
#[command(version)]
struct Args {
    /// Root folder holding the catalog database (overrides AHAN_ROOT_FOLDER and config)
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Config file (default: ~/.config/ahan/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and AHAN_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ahan_hub=info,ahan_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any store latency
    info!(
        "Starting AhanHub (ahan-hub) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TomlConfig::load(path)?,
        None => TomlConfig::load_default()?,
    };
    config.apply_env_overrides()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let stores = match config.store.backend {
        StoreBackend::Sqlite => {
            let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
            let db_path = root_folder.join(DATABASE_FILE);
            info!("Database: {}", db_path.display());

            let pool = init_database(&db_path)
                .await
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            CatalogStores::from_backend(Arc::new(SqliteStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; catalog changes are lost on exit");
            CatalogStores::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    let dataset = DefaultDataset::bundled()?;
    let catalog = Arc::new(Catalog::new());
    let report = bootstrap(&stores, &catalog, &dataset, config.seed.enabled).await;
    if let Some(notice) = report.notice() {
        error!("{}", notice);
    }

    let confirmation_delay = Duration::from_millis(config.admin.confirmation_delay_ms);
    let state = AppState {
        stores,
        catalog,
        sessions: Arc::new(SessionStore::new(confirmation_delay)),
        credentials: Arc::new(ConfiguredCredentials::from_config(&config.admin)),
        text: Arc::new(DisabledTextGenerator),
        startup: Arc::new(report),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("ahan-hub listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
