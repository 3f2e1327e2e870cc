//! Census engine binary for the Bibite Census pipeline.
//!
//! This is the main entry point that wires together the autosave watcher,
//! ingestion controller, shared time series store, metrics sink, and
//! export API server. It loads configuration, initializes all subsystems,
//! catches up on pre-existing archives, and then watches the autosave
//! directory until the process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `census-config.yaml`
//! 3. Create the shared time series store
//! 4. Start the export API server
//! 5. Build the metrics sink and ingestion controller
//! 6. Catch up on archives already in the autosave directory
//! 7. Watch the directory and fold each new archive

mod config;
mod controller;
mod error;
mod sink;
mod watch;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use census_observer::server::{ServerConfig, start_server};
use census_observer::state::AppState;
use census_store::SharedStore;
use census_types::RunIdentity;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::CensusConfig;
use crate::controller::IngestionController;
use crate::error::EngineError;
use crate::sink::MetricsSink;
use crate::watch::AutosaveWatcher;

/// Default configuration file path, overridable via `CENSUS_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "census-config.yaml";

/// Application entry point for the census engine.
///
/// Initializes all subsystems and runs the watch loop. Returns an error
/// code on startup failure; per-archive failures are logged and survived.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("census-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    let target = RunIdentity::new(&config.target.scenario, &config.target.run);
    info!(
        target = %target,
        autosave_dir = %config.ingest.autosave_dir.display(),
        debounce_seconds = config.ingest.debounce_seconds,
        materials = ?config.materials,
        "Configuration loaded"
    );

    // 3. Create the shared time series store.
    let store = SharedStore::new();

    // 4. Start the export API server.
    let app_state = Arc::new(AppState::new(store.clone(), target.clone()));
    let server_config = ServerConfig {
        host: config.observer.host.clone(),
        port: config.observer.port,
    };
    tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, app_state).await {
            error!(error = %e, "export server terminated");
        }
    });
    info!(
        host = config.observer.host,
        port = config.observer.port,
        "Export API server started"
    );

    // 5. Build the metrics sink and ingestion controller.
    let sink = MetricsSink::from_config(&config.influx);
    info!(sink = sink.name(), "Metrics sink selected");

    if let Some(retention_dir) = &config.ingest.retention_dir {
        std::fs::create_dir_all(retention_dir)?;
        info!(retention_dir = %retention_dir.display(), "Retention enabled");
    }

    let controller = IngestionController::new(
        store,
        sink,
        target,
        config.materials.clone(),
        config.ingest.retention_dir.clone(),
    );

    std::fs::create_dir_all(&config.ingest.autosave_dir)?;

    // 6. Catch up on archives already present.
    if config.ingest.catch_up_on_start {
        let summary = controller
            .catch_up(&config.ingest.autosave_dir)
            .await
            .map_err(|source| EngineError::CatchUp { source })?;
        info!(
            folded = summary.folded,
            rejected = summary.rejected,
            failed = summary.failed,
            "Catch-up scan complete"
        );
    }

    // 7. Watch the directory and fold each new archive.
    let mut watcher = AutosaveWatcher::start(&config.ingest.autosave_dir)
        .map_err(EngineError::from)?;
    let debounce = Duration::from_secs(config.ingest.debounce_seconds);
    info!(
        autosave_dir = %config.ingest.autosave_dir.display(),
        "Watching for autosaves"
    );

    while let Some(path) = watcher.next().await {
        // Give the simulation time to finish writing the archive.
        tokio::time::sleep(debounce).await;
        controller.process_archive(&path).await;
    }

    info!("census-engine watch stream closed, shutting down");
    Ok(())
}

/// Load the engine configuration.
///
/// The path comes from the `CENSUS_CONFIG` environment variable, falling
/// back to `census-config.yaml` in the working directory. A missing file
/// is not an error; defaults apply.
fn load_config() -> Result<CensusConfig, EngineError> {
    let path = std::env::var("CENSUS_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path);
    if path.exists() {
        let config = CensusConfig::from_file(path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(CensusConfig::default())
    }
}
