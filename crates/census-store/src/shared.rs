//! Shared handle over the time series store.
//!
//! The scheduling model is a single ingestion worker folding scenes while
//! the export API reads concurrently. [`SharedStore`] enforces that shape:
//! `fold` holds the write lock for the entire append (a reader can never
//! observe a store where the time axis grew but a species series did not),
//! and readers take a point-in-time deep copy under the read lock instead
//! of iterating live sequences.

use std::sync::Arc;

use census_types::Scene;
use tokio::sync::RwLock;

use crate::series::TimeSeriesStore;

/// Cloneable shared handle: one writer, any number of snapshot readers.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<TimeSeriesStore>>,
}

impl SharedStore {
    /// Create a handle over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one scene as a single atomic step.
    pub async fn fold(&self, scene: &Scene) {
        let mut store = self.inner.write().await;
        store.fold(scene);
    }

    /// Take a consistent point-in-time snapshot for the read path.
    pub async fn snapshot(&self) -> TimeSeriesStore {
        self.inner.read().await.snapshot()
    }

    /// Number of folded scenes.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no scene has been folded yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
