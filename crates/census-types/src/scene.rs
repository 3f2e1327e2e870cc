//! One fully aggregated snapshot.
//!
//! A [`Scene`] is built fresh per archive by the scene aggregator, folded
//! into the time series store, and then discarded. It is never mutated
//! after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stats::GeneStats;

/// Pellet statistics for one material within one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PelletStat {
    /// Number of pellets whose material field matched exactly.
    pub count: u64,
    /// Sum of `energy_density(material) * amount` over matching pellets.
    pub energy: f64,
}

/// Per-species statistics within one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSnapshotStat {
    /// Number of organisms of this species present in the snapshot.
    pub count: u64,
    /// Sum of organism total energy.
    pub total_energy: f64,
    /// Per-gene summary statistics over exactly this species' organisms.
    pub gene_stats: BTreeMap<String, GeneStats>,
}

/// One fully aggregated snapshot keyed by simulated time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Simulated elapsed seconds reported by the scene document.
    pub simulated_time: f64,
    /// Total organism count: the scene document's `nBibites` when present,
    /// otherwise the number of organism records aggregated.
    pub total_organism_count: u64,
    /// Per-material pellet statistics, keyed by material name.
    pub pellets: BTreeMap<String, PelletStat>,
    /// Per-species statistics, keyed by display name.
    pub species: BTreeMap<String, SpeciesSnapshotStat>,
}

impl Scene {
    /// Simulated time rendered as `H:MM:SS` for log output.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn simulated_time_display(&self) -> String {
        let total = if self.simulated_time.is_finite() && self.simulated_time > 0.0 {
            self.simulated_time as u64
        } else {
            0
        };
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scene:")?;
        writeln!(f, "Simulated Time: {}", self.simulated_time_display())?;
        writeln!(f)?;
        for (material, stat) in &self.pellets {
            writeln!(f, "{material} pellets: {}", stat.count)?;
            writeln!(f, "{material} energy: {}", stat.energy)?;
            writeln!(f)?;
        }
        for (name, stat) in &self.species {
            writeln!(f, "{name} count: {}", stat.count)?;
            writeln!(f, "{name} total energy: {}", stat.total_energy)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
