//! The time series store and its per-metric series.
//!
//! The store lives for the process lifetime and is intentionally unbounded:
//! long experiments restart the process between runs rather than prune
//! online. Out-of-order simulated times are accepted as-is -- the single
//! sequential ingestion feed guarantees fold order equals archive order.

use std::collections::BTreeMap;

use census_types::Scene;
use serde::Serialize;

/// Per-material pellet series, index-aligned with the time axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PelletSeries {
    /// Pellet count per snapshot; `None` where the material was absent.
    pub count: Vec<Option<u64>>,
    /// Pellet energy per snapshot; `None` where the material was absent.
    pub energy: Vec<Option<f64>>,
}

impl PelletSeries {
    fn backfilled(len: usize) -> Self {
        Self {
            count: vec![None; len],
            energy: vec![None; len],
        }
    }

    fn push_absent(&mut self) {
        self.count.push(None);
        self.energy.push(None);
    }

    fn len(&self) -> usize {
        self.count.len()
    }
}

/// One gene's summary-statistic series for one species.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneSeries {
    /// Mean per snapshot.
    pub mean: Vec<Option<f64>>,
    /// Median per snapshot.
    pub median: Vec<Option<f64>>,
    /// Minimum per snapshot.
    pub min: Vec<Option<f64>>,
    /// Maximum per snapshot.
    pub max: Vec<Option<f64>>,
}

impl GeneSeries {
    fn backfilled(len: usize) -> Self {
        Self {
            mean: vec![None; len],
            median: vec![None; len],
            min: vec![None; len],
            max: vec![None; len],
        }
    }

    fn push_absent(&mut self) {
        self.mean.push(None);
        self.median.push(None);
        self.min.push(None);
        self.max.push(None);
    }

    fn len(&self) -> usize {
        self.mean.len()
    }
}

/// Per-species series: count, total energy, and per-gene sub-series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSeries {
    /// Organism count per snapshot; `None` where the species was absent.
    pub count: Vec<Option<u64>>,
    /// Total energy per snapshot; `None` where the species was absent.
    pub total_energy: Vec<Option<f64>>,
    /// Per-gene statistic series, keyed by gene name.
    pub genes: BTreeMap<String, GeneSeries>,
}

impl SpeciesSeries {
    fn backfilled(len: usize) -> Self {
        Self {
            count: vec![None; len],
            total_energy: vec![None; len],
            genes: BTreeMap::new(),
        }
    }

    /// Append a null to the count/energy series and every gene sub-series.
    fn push_absent(&mut self) {
        self.count.push(None);
        self.total_energy.push(None);
        for series in self.genes.values_mut() {
            series.push_absent();
        }
    }

    fn len(&self) -> usize {
        self.count.len()
    }
}

/// The process-lifetime accumulator of folded scenes.
///
/// Invariant: after every [`fold`](Self::fold), every series (including
/// every gene sub-series) has exactly the same length as the time axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesStore {
    /// The simulated-time axis, one entry per folded scene.
    time: Vec<f64>,
    /// Total organism count per snapshot.
    organisms: Vec<u64>,
    /// Per-material pellet series.
    pellets: BTreeMap<String, PelletSeries>,
    /// Per-species series, keyed by display name.
    species: BTreeMap<String, SpeciesSeries>,
}

impl TimeSeriesStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folded scenes.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether no scene has been folded yet.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The simulated-time axis.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// The total organism count series.
    pub fn organisms(&self) -> &[u64] {
        &self.organisms
    }

    /// Per-material pellet series.
    pub const fn pellets(&self) -> &BTreeMap<String, PelletSeries> {
        &self.pellets
    }

    /// Per-species series.
    pub const fn species(&self) -> &BTreeMap<String, SpeciesSeries> {
        &self.species
    }

    /// Names of every species the store has seen, in sorted order.
    pub fn species_names(&self) -> Vec<String> {
        self.species.keys().cloned().collect()
    }

    /// Append one scene's results.
    ///
    /// Series for species/materials/genes absent from this scene append a
    /// null; series appearing for the first time are backfilled with nulls
    /// up to the pre-fold length. The whole fold is one atomic step from
    /// the perspective of [`SharedStore`](crate::shared::SharedStore)
    /// readers.
    pub fn fold(&mut self, scene: &Scene) {
        let prior_len = self.time.len();
        self.time.push(scene.simulated_time);
        self.organisms.push(scene.total_organism_count);

        for (material, stat) in &scene.pellets {
            let series = self
                .pellets
                .entry(material.clone())
                .or_insert_with(|| PelletSeries::backfilled(prior_len));
            series.count.push(Some(stat.count));
            series.energy.push(Some(stat.energy));
        }
        for series in self.pellets.values_mut() {
            if series.len() == prior_len {
                series.push_absent();
            }
        }

        for (name, stat) in &scene.species {
            let series = self
                .species
                .entry(name.clone())
                .or_insert_with(|| SpeciesSeries::backfilled(prior_len));
            series.count.push(Some(stat.count));
            series.total_energy.push(Some(stat.total_energy));
            for (gene, stats) in &stat.gene_stats {
                let gene_series = series
                    .genes
                    .entry(gene.clone())
                    .or_insert_with(|| GeneSeries::backfilled(prior_len));
                gene_series.mean.push(Some(stats.mean));
                gene_series.median.push(Some(stats.median));
                gene_series.min.push(Some(stats.min));
                gene_series.max.push(Some(stats.max));
            }
            for gene_series in series.genes.values_mut() {
                if gene_series.len() == prior_len {
                    gene_series.push_absent();
                }
            }
        }
        for series in self.species.values_mut() {
            if series.len() == prior_len {
                series.push_absent();
            }
        }

        debug_assert!(self.is_aligned(), "series lengths diverged after fold");
    }

    /// Whether every series has the same length as the time axis.
    pub fn is_aligned(&self) -> bool {
        let expected = self.time.len();
        if self.organisms.len() != expected {
            return false;
        }
        if self
            .pellets
            .values()
            .any(|series| series.count.len() != expected || series.energy.len() != expected)
        {
            return false;
        }
        self.species.values().all(|series| {
            series.count.len() == expected
                && series.total_energy.len() == expected
                && series.genes.values().all(|gene| {
                    gene.mean.len() == expected
                        && gene.median.len() == expected
                        && gene.min.len() == expected
                        && gene.max.len() == expected
                })
        })
    }

    /// Read-only point-in-time copy for the export boundary.
    ///
    /// Consumers get a deep copy rather than access to the live sequences,
    /// so a reader can never observe a torn fold.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use census_types::{GeneStats, PelletStat, SpeciesSnapshotStat};

    use super::*;

    fn gene_stats(value: f64) -> GeneStats {
        GeneStats {
            mean: value,
            median: value,
            min: value,
            max: value,
        }
    }

    fn scene(
        time: f64,
        species: &[(&str, u64, f64, &[(&str, f64)])],
        pellets: &[(&str, u64, f64)],
    ) -> Scene {
        let species_map = species
            .iter()
            .map(|(name, count, energy, genes)| {
                let gene_stats_map = genes
                    .iter()
                    .map(|(gene, value)| ((*gene).to_owned(), gene_stats(*value)))
                    .collect();
                (
                    (*name).to_owned(),
                    SpeciesSnapshotStat {
                        count: *count,
                        total_energy: *energy,
                        gene_stats: gene_stats_map,
                    },
                )
            })
            .collect();
        let pellet_map = pellets
            .iter()
            .map(|(material, count, energy)| {
                (
                    (*material).to_owned(),
                    PelletStat {
                        count: *count,
                        energy: *energy,
                    },
                )
            })
            .collect();
        Scene {
            simulated_time: time,
            total_organism_count: species.iter().map(|(_, count, ..)| count).sum(),
            pellets: pellet_map,
            species: species_map,
        }
    }

    #[test]
    fn folding_n_scenes_aligns_every_series() {
        let mut store = TimeSeriesStore::new();
        // Species appear and disappear across snapshots.
        store.fold(&scene(
            1.0,
            &[("A", 3, 30.0, &[("Diet", 0.1)])],
            &[("Plant", 5, 50.0)],
        ));
        store.fold(&scene(
            2.0,
            &[
                ("A", 4, 40.0, &[("Diet", 0.2)]),
                ("B", 1, 5.0, &[("Diet", 0.9)]),
            ],
            &[("Plant", 4, 40.0), ("Meat", 1, 37.5)],
        ));
        store.fold(&scene(3.0, &[("B", 2, 11.0, &[("Diet", 0.8)])], &[]));

        assert_eq!(store.len(), 3);
        assert!(store.is_aligned());
        assert_eq!(store.time(), &[1.0, 2.0, 3.0]);

        let a = store.species().get("A").unwrap();
        assert_eq!(a.count, vec![Some(3), Some(4), None]);
        let b = store.species().get("B").unwrap();
        assert_eq!(b.count, vec![None, Some(1), Some(2)]);

        let meat = store.pellets().get("Meat").unwrap();
        assert_eq!(meat.count, vec![None, Some(1), None]);
        assert_eq!(meat.energy, vec![None, Some(37.5), None]);
    }

    #[test]
    fn species_absent_from_middle_snapshot_gets_null_not_gap() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(1.0, &[("A", 2, 20.0, &[("Size", 1.0)])], &[]));
        store.fold(&scene(2.0, &[], &[]));
        store.fold(&scene(3.0, &[("A", 1, 9.0, &[("Size", 1.2)])], &[]));

        let a = store.species().get("A").unwrap();
        assert_eq!(a.count, vec![Some(2), None, Some(1)]);
        assert_eq!(a.total_energy, vec![Some(20.0), None, Some(9.0)]);
        let size = a.genes.get("Size").unwrap();
        assert_eq!(size.mean, vec![Some(1.0), None, Some(1.2)]);
        assert_eq!(size.max, vec![Some(1.0), None, Some(1.2)]);
    }

    #[test]
    fn new_gene_mid_run_is_backfilled() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(1.0, &[("A", 1, 1.0, &[("Diet", 0.5)])], &[]));
        store.fold(&scene(
            2.0,
            &[("A", 1, 1.0, &[("Diet", 0.5), ("Armor", 0.2)])],
            &[],
        ));
        store.fold(&scene(3.0, &[("A", 1, 1.0, &[("Diet", 0.5)])], &[]));

        let armor = store.species().get("A").unwrap().genes.get("Armor").unwrap();
        assert_eq!(armor.mean, vec![None, Some(0.2), None]);
        assert!(store.is_aligned());
    }

    #[test]
    fn out_of_order_times_are_accepted_as_is() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(10.0, &[], &[]));
        store.fold(&scene(5.0, &[], &[]));
        assert_eq!(store.time(), &[10.0, 5.0]);
    }

    #[test]
    fn organisms_series_tracks_totals() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(1.0, &[("A", 3, 1.0, &[])], &[]));
        store.fold(&scene(2.0, &[("A", 2, 1.0, &[]), ("B", 2, 1.0, &[])], &[]));
        assert_eq!(store.organisms(), &[3, 4]);
    }

    #[test]
    fn snapshot_is_independent_of_later_folds() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(1.0, &[("A", 1, 1.0, &[])], &[]));
        let snapshot = store.snapshot();
        store.fold(&scene(2.0, &[("A", 2, 2.0, &[])], &[]));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn serializes_camel_case_for_the_export_api() {
        let mut store = TimeSeriesStore::new();
        store.fold(&scene(1.0, &[("A", 1, 1.0, &[])], &[]));
        let json = serde_json::to_value(&store).unwrap();
        assert!(json.get("time").is_some());
        assert!(json.get("organisms").is_some());
        let species = json.get("species").unwrap().get("A").unwrap();
        assert!(species.get("totalEnergy").is_some());
    }
}
