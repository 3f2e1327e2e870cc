//! Shared application state for the export API server.
//!
//! [`AppState`] holds the store handle plus immutable run metadata. All
//! endpoint reads go through [`SharedStore`] snapshots, so handlers never
//! hold a lock across serialization.

use census_store::SharedStore;
use census_types::RunIdentity;
use chrono::{DateTime, Utc};

/// Shared state injected into every handler via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the time series store fed by the ingestion worker.
    pub store: SharedStore,
    /// The run identity this process is tracking.
    pub target: RunIdentity,
    /// When this process started, for the status page.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state for a given store handle and tracked run.
    pub fn new(store: SharedStore, target: RunIdentity) -> Self {
        Self {
            store,
            target,
            started_at: Utc::now(),
        }
    }
}
