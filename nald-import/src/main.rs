//! nald-import - NALD licensing data import service
//!
//! Imports the nightly NALD staging extract into the normalized licensing
//! schema: companies first, then licences gated behind their completion,
//! with historical bill runs available on demand. Runs daily at the
//! configured time and exposes a small admin HTTP surface for manual
//! triggers and progress streaming.

use anyhow::Result;
use nald_common::config::ImportConfig;
use nald_common::events::EventBus;
use nald_import::db::extract::SqliteExtractor;
use nald_import::db::load::SqliteLoader;
use nald_import::orchestrator::handlers::ImportHandler;
use nald_import::orchestrator::{scheduler, Orchestrator};
use nald_import::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting nald-import service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1);
    let config = ImportConfig::load(config_path.as_deref().map(Path::new))?;
    info!(
        import_enabled = config.import_enabled,
        schedule = format!("{:02}:{:02}", config.schedule.hour, config.schedule.minute),
        "Configuration loaded"
    );

    let db_pool = nald_import::db::init_database_pool(Path::new(&config.database_path)).await?;
    info!("Database: {}", config.database_path);

    let event_bus = EventBus::new(100);

    let handler = Arc::new(ImportHandler::new(
        Arc::new(SqliteExtractor::new(db_pool.clone())),
        Arc::new(SqliteLoader::new(db_pool.clone())),
    ));
    let orchestrator = Orchestrator::start(&config, handler, event_bus.clone());

    tokio::spawn(scheduler::run_scheduler(
        config.clone(),
        orchestrator.clone(),
    ));

    let state = AppState::new(db_pool, event_bus, orchestrator);
    let app = nald_import::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
