//! The ingestion controller.
//!
//! Owns the per-archive pipeline: open the archive, read the run's
//! settings, filter by run identity, aggregate a scene, fold it into the
//! shared store, ship metric points, and copy the archive into the
//! retention directory. One archive in, one of three outcomes out:
//! folded, rejected (wrong run), or failed. Failures are logged and the
//! controller keeps watching; no archive can take the engine down.

use std::path::{Path, PathBuf};

use census_ingest::archive::{SETTINGS_ENTRY, SPECIES_ENTRY};
use census_ingest::{IngestError, RunSettings, SaveArchive, aggregate, parse_catalog};
use census_store::SharedStore;
use census_types::{RunIdentity, Scene};
use tracing::{debug, info, warn};

use crate::sink::MetricsSink;

/// What happened to one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The scene was aggregated and folded into the time series.
    Folded,
    /// The archive belongs to a different run and was skipped.
    Rejected,
    /// Processing failed; the failure was logged.
    Failed,
}

/// Outcome counts from a startup catch-up scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUpSummary {
    /// Archives folded into the store.
    pub folded: usize,
    /// Archives rejected for belonging to another run.
    pub rejected: usize,
    /// Archives that failed to process.
    pub failed: usize,
}

/// Drives archives through the ingestion pipeline.
pub struct IngestionController {
    store: SharedStore,
    sink: MetricsSink,
    target: RunIdentity,
    materials: Vec<String>,
    retention_dir: Option<PathBuf>,
}

impl IngestionController {
    /// Build a controller for one tracked run.
    pub const fn new(
        store: SharedStore,
        sink: MetricsSink,
        target: RunIdentity,
        materials: Vec<String>,
        retention_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            sink,
            target,
            materials,
            retention_dir,
        }
    }

    /// Process one archive end to end.
    ///
    /// Never returns an error: failures are logged with their kind and
    /// reported as [`ArchiveOutcome::Failed`] so the watch loop survives
    /// corrupt or half-written archives.
    pub async fn process_archive(&self, path: &Path) -> ArchiveOutcome {
        info!(archive = %path.display(), "autosave detected");
        match self.try_process(path).await {
            Ok(Some(scene)) => {
                info!(
                    archive = %path.display(),
                    simulated_time = scene.simulated_time,
                    organisms = scene.total_organism_count,
                    species = scene.species.len(),
                    "archive folded"
                );
                ArchiveOutcome::Folded
            }
            Ok(None) => ArchiveOutcome::Rejected,
            Err(error) => {
                warn!(
                    archive = %path.display(),
                    kind = error.kind(),
                    error = %error,
                    "archive failed; continuing to watch"
                );
                ArchiveOutcome::Failed
            }
        }
    }

    /// The pipeline proper. `Ok(None)` means identity mismatch.
    async fn try_process(&self, path: &Path) -> Result<Option<Scene>, IngestError> {
        let mut archive = SaveArchive::open(path)?;

        debug!(archive = %path.display(), "decoding run settings");
        let settings = RunSettings::parse(&archive.read(SETTINGS_ENTRY)?)?;

        if settings.identity != self.target {
            info!(
                archive = %path.display(),
                found = %settings.identity,
                target = %self.target,
                "archive belongs to another run; rejected"
            );
            return Ok(None);
        }

        let catalog =
            parse_catalog(&archive.read(SPECIES_ENTRY)?).map_err(IngestError::Catalog)?;
        debug!(species = catalog.len(), "species catalog loaded");

        let scene = aggregate(&settings, &catalog, &mut archive, &self.materials)?;

        self.store.fold(&scene).await;

        // The fold is already committed; metric shipping is best-effort.
        if let Err(error) = self.sink.record_scene(&self.target, &scene).await {
            warn!(error = %error, "metric shipping failed; fold already committed");
        }

        self.retain(path);

        Ok(Some(scene))
    }

    /// Copy a folded archive into the retention directory, if configured.
    ///
    /// Only folded archives are retained; rejected and failed archives
    /// stay where the simulation wrote them.
    fn retain(&self, path: &Path) {
        let Some(retention_dir) = &self.retention_dir else {
            return;
        };
        let Some(file_name) = path.file_name() else {
            return;
        };
        let destination = retention_dir.join(file_name);
        match std::fs::copy(path, &destination) {
            Ok(_) => {
                debug!(retained = %destination.display(), "archive retained");
            }
            Err(error) => {
                warn!(
                    archive = %path.display(),
                    error = %error,
                    "retention copy failed; fold already committed"
                );
            }
        }
    }

    /// Process every archive already present in `dir`, in lexicographic
    /// name order, before live watching begins.
    ///
    /// # Errors
    ///
    /// Fails only if the directory itself cannot be scanned; individual
    /// archive failures are counted, not propagated.
    pub async fn catch_up(&self, dir: &Path) -> Result<CatchUpSummary, std::io::Error> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_zip = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
            if path.is_file() && is_zip {
                paths.push(path);
            }
        }
        paths.sort();

        let mut summary = CatchUpSummary::default();
        for path in paths {
            match self.process_archive(&path).await {
                ArchiveOutcome::Folded => summary.folded = summary.folded.saturating_add(1),
                ArchiveOutcome::Rejected => summary.rejected = summary.rejected.saturating_add(1),
                ArchiveOutcome::Failed => summary.failed = summary.failed.saturating_add(1),
            }
        }
        Ok(summary)
    }
}
