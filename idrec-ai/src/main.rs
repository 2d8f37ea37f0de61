//! idrec-ai - Identity document reconciliation service
//!
//! Accepts two scans of identity documents, extracts their fields through
//! a document converter and a language model, and reports where the two
//! documents agree. Confirmed records are kept in a local SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use idrec_common::config::{ConfigSource, DataFolderInitializer, TomlConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use idrec_ai::config::{CliArgs, ServiceConfig};
use idrec_ai::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config_path = args.config_path();
    let toml = TomlConfig::load_or_default(config_path.as_deref())?;

    // Subscriber goes up before anything below logs. RUST_LOG wins over
    // the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(ServiceConfig::log_level(&args, &toml)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting idrec-ai v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    ConfigSource::of(config_path.as_deref()).log();

    let config = ServiceConfig::resolve(&args, toml);

    let initializer = DataFolderInitializer::new(config.data_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize data folder")?;

    let db_path = initializer.database_path();
    if initializer.database_exists() {
        info!("Database: {}", db_path.display());
    } else {
        info!("Creating database: {}", db_path.display());
    }
    let db_pool = idrec_ai::db::init_database_pool(&db_path).await?;

    info!(
        converter = ?config.converter.kind,
        extractor_url = %config.extractor.url,
        model = %config.extractor.model,
        "Extraction pipeline configured"
    );
    let orchestrator = config.build_orchestrator()?;

    let state = AppState::new(db_pool, orchestrator);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
