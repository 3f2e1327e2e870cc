//! The scene aggregator.
//!
//! Given the run's settings, the species catalog, and an open archive,
//! computes one [`Scene`]: simulated elapsed time, total organism count,
//! per-material pellet count/energy, and per-species count, total energy,
//! and per-gene summary statistics.
//!
//! Failure policy: if any organism record fails to decode or resolve, the
//! whole call fails. A statistic computed over a subset of organisms
//! without signaling the omission would silently corrupt the time series.

use std::collections::BTreeMap;

use census_types::{GeneStats, Organism, PelletStat, Scene, SpeciesCatalog, SpeciesSnapshotStat};
use serde::Deserialize;
use tracing::debug;

use crate::archive::{PELLETS_ENTRY, SCENE_ENTRY, SaveArchive};
use crate::decode::decode_into;
use crate::error::AggregateError;
use crate::settings::RunSettings;

/// Materials tracked when the configuration does not name its own list.
pub const DEFAULT_TRACKED_MATERIALS: [&str; 2] = ["Plant", "Meat"];

/// Synthetic gene derived from `HatchTime` and `BroodTime`.
///
/// The census tracks `(HatchTime / BroodTime)^2` as a maturity-at-birth
/// signal; it is only sampled for organisms that carry both genes with a
/// non-zero brood time.
pub const BIRTH_MATURITY_GENE: &str = "BirthMaturity";

/// Raw shape of `scene.bb8scene`; only the scalars the census reads.
#[derive(Debug, Deserialize)]
struct SceneDoc {
    #[serde(rename = "simulatedTime")]
    simulated_time: f64,
    #[serde(rename = "nBibites", default)]
    n_bibites: Option<u64>,
}

/// Raw shape of `pellets.bb8scene`: a list of zones, each a list of slots.
#[derive(Debug, Deserialize)]
struct PelletFile {
    #[serde(default)]
    pellets: Vec<PelletZone>,
}

#[derive(Debug, Deserialize)]
struct PelletZone {
    #[serde(default)]
    pellets: Vec<PelletSlot>,
}

#[derive(Debug, Deserialize)]
struct PelletSlot {
    pellet: PelletBody,
}

#[derive(Debug, Deserialize)]
struct PelletBody {
    material: String,
    amount: f64,
}

/// Raw shape of one organism record (`bibites/*.bb8`).
#[derive(Debug, Deserialize)]
struct OrganismDoc {
    genes: OrganismGenes,
    body: OrganismBody,
}

#[derive(Debug, Deserialize)]
struct OrganismGenes {
    #[serde(rename = "speciesID")]
    species_id: i64,
    #[serde(default)]
    genes: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct OrganismBody {
    #[serde(rename = "totalEnergy")]
    total_energy: f64,
}

impl From<OrganismDoc> for Organism {
    fn from(doc: OrganismDoc) -> Self {
        Self {
            species_id: doc.genes.species_id,
            total_energy: doc.body.total_energy,
            genes: doc.genes.genes,
        }
    }
}

/// Running per-species totals while organisms are being consumed.
#[derive(Debug, Default)]
struct SpeciesAccumulator {
    count: u64,
    total_energy: f64,
    gene_samples: BTreeMap<String, Vec<f64>>,
}

impl SpeciesAccumulator {
    fn consume(&mut self, organism: &Organism) {
        self.count = self.count.saturating_add(1);
        self.total_energy += organism.total_energy;
        for (gene, value) in &organism.genes {
            self.gene_samples
                .entry(gene.clone())
                .or_default()
                .push(*value);
        }
        if let Some(maturity) = birth_maturity(organism) {
            self.gene_samples
                .entry(BIRTH_MATURITY_GENE.to_owned())
                .or_default()
                .push(maturity);
        }
    }

    fn finish(self) -> SpeciesSnapshotStat {
        let gene_stats = self
            .gene_samples
            .into_iter()
            .filter_map(|(gene, samples)| {
                GeneStats::from_samples(&samples).map(|stats| (gene, stats))
            })
            .collect();
        SpeciesSnapshotStat {
            count: self.count,
            total_energy: self.total_energy,
            gene_stats,
        }
    }
}

/// `(HatchTime / BroodTime)^2`, when both genes are present and the brood
/// time is non-zero.
fn birth_maturity(organism: &Organism) -> Option<f64> {
    let hatch = organism.gene("HatchTime")?;
    let brood = organism.gene("BroodTime")?;
    if brood.abs() > 0.0 {
        let ratio = hatch / brood;
        Some(ratio * ratio)
    } else {
        None
    }
}

/// Aggregate one archive into a [`Scene`].
///
/// `tracked_materials` names the pellet materials to account for; every
/// tracked material appears in the result, with zero stats when no pellet
/// matched. A pellet counts toward a material only on an exact,
/// case-sensitive string match.
pub fn aggregate(
    settings: &RunSettings,
    catalog: &SpeciesCatalog,
    archive: &mut SaveArchive,
    tracked_materials: &[String],
) -> Result<Scene, AggregateError> {
    // Scene-level scalars.
    let scene_doc: SceneDoc =
        decode_into(&archive.read(SCENE_ENTRY)?).map_err(|source| AggregateError::Decode {
            file: SCENE_ENTRY.to_owned(),
            source,
        })?;

    // Pellet accounting per tracked material.
    let pellet_file: PelletFile =
        decode_into(&archive.read(PELLETS_ENTRY)?).map_err(|source| AggregateError::Decode {
            file: PELLETS_ENTRY.to_owned(),
            source,
        })?;

    let mut pellets = BTreeMap::new();
    for material in tracked_materials {
        let density = settings.materials.energy_density(material).ok_or_else(|| {
            AggregateError::UnknownMaterial {
                material: material.clone(),
            }
        })?;
        pellets.insert(material.clone(), pellet_stat(&pellet_file, material, density));
    }

    // Organism census.
    let mut accumulators: BTreeMap<String, SpeciesAccumulator> = BTreeMap::new();
    let records = archive.organism_records()?;
    let record_count = records.len() as u64;

    for (file, payload) in records {
        let doc: OrganismDoc =
            decode_into(&payload).map_err(|source| AggregateError::Decode {
                file: file.clone(),
                source,
            })?;
        let organism = Organism::from(doc);
        let name = catalog.resolve(organism.species_id).ok_or(
            AggregateError::UnknownSpecies {
                file,
                species_id: organism.species_id,
            },
        )?;
        accumulators.entry(name).or_default().consume(&organism);
    }

    let species: BTreeMap<String, SpeciesSnapshotStat> = accumulators
        .into_iter()
        .map(|(name, acc)| (name, acc.finish()))
        .collect();

    let scene = Scene {
        simulated_time: scene_doc.simulated_time,
        total_organism_count: scene_doc.n_bibites.unwrap_or(record_count),
        pellets,
        species,
    };

    debug!(
        simulated_time = scene.simulated_time,
        organisms = scene.total_organism_count,
        species = scene.species.len(),
        "scene aggregated"
    );

    Ok(scene)
}

/// Count and energy for one material across every pellet zone.
fn pellet_stat(file: &PelletFile, material: &str, density: f64) -> PelletStat {
    let mut stat = PelletStat::default();
    for zone in &file.pellets {
        for slot in &zone.pellets {
            if slot.pellet.material == material {
                stat.count = stat.count.saturating_add(1);
                stat.energy = density.mul_add(slot.pellet.amount, stat.energy);
            }
        }
    }
    stat
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use census_types::SpeciesCatalogEntry;

    use super::*;
    use crate::archive::{SETTINGS_ENTRY, SPECIES_ENTRY};
    use crate::species::parse_catalog;

    const SETTINGS: &[u8] = br#"{
        "materials": {
            "PlantSettings": {"energyDensity": 10.0},
            "MeatSettings": {"energyDensity": 37.5}
        },
        "zones": [{"name": "Control 3"}]
    }"#;

    const SPECIES: &[u8] = br#"{"recordedSpecies": [
        {"speciesID": 0, "genericName": "Bibus", "specificName": "communis"},
        {"speciesID": 1, "genericName": "Bibus", "specificName": "velox"}
    ]}"#;

    fn organism(species_id: i64, energy: f64, genes: &[(&str, f64)]) -> Vec<u8> {
        let gene_map: serde_json::Map<String, serde_json::Value> = genes
            .iter()
            .map(|(name, value)| ((*name).to_owned(), serde_json::json!(value)))
            .collect();
        serde_json::to_vec(&serde_json::json!({
            "genes": {"speciesID": species_id, "genes": gene_map},
            "body": {"totalEnergy": energy}
        }))
        .unwrap()
    }

    fn tracked() -> Vec<String> {
        DEFAULT_TRACKED_MATERIALS
            .iter()
            .map(|m| (*m).to_owned())
            .collect()
    }

    fn build_archive(entries: &[(&str, &[u8])]) -> SaveArchive {
        SaveArchive::from_zip_bytes(crate::archive::zip_bytes(entries)).unwrap()
    }

    fn scene_entry() -> &'static [u8] {
        br#"{"simulatedTime": 3600.0, "nBibites": 3}"#
    }

    fn pellets_entry() -> &'static [u8] {
        br#"{"pellets": [
            {"pellets": [
                {"pellet": {"material": "Plant", "amount": 2.0}},
                {"pellet": {"material": "Meat", "amount": 1.0}}
            ]},
            {"pellets": [
                {"pellet": {"material": "Plant", "amount": 3.0}}
            ]}
        ]}"#
    }

    #[test]
    fn aggregates_pellets_species_and_genes() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let a = organism(0, 100.0, &[("Diet", 0.2), ("SizeRatio", 1.0)]);
        let b = organism(0, 150.0, &[("Diet", 0.4), ("SizeRatio", 1.5)]);
        let c = organism(1, 80.0, &[("Diet", 0.9)]);
        let mut archive = build_archive(&[
            (SCENE_ENTRY, scene_entry()),
            (PELLETS_ENTRY, pellets_entry()),
            (SPECIES_ENTRY, SPECIES),
            ("bibites/a.bb8", &a),
            ("bibites/b.bb8", &b),
            ("bibites/c.bb8", &c),
        ]);

        let scene = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap();

        assert_eq!(scene.simulated_time, 3600.0);
        assert_eq!(scene.total_organism_count, 3);

        // Two Plant pellets of amount 2 and 3 at density 10 -> 50 energy.
        let plant = scene.pellets.get("Plant").unwrap();
        assert_eq!(plant.count, 2);
        assert_eq!(plant.energy, 50.0);
        let meat = scene.pellets.get("Meat").unwrap();
        assert_eq!(meat.count, 1);
        assert_eq!(meat.energy, 37.5);

        let communis = scene.species.get("Bibus communis").unwrap();
        assert_eq!(communis.count, 2);
        assert_eq!(communis.total_energy, 250.0);
        let diet = communis.gene_stats.get("Diet").unwrap();
        assert_eq!(diet.mean, (0.2 + 0.4) / 2.0);
        assert_eq!(diet.min, 0.2);
        assert_eq!(diet.max, 0.4);

        let velox = scene.species.get("Bibus velox").unwrap();
        assert_eq!(velox.count, 1);
        assert_eq!(velox.gene_stats.get("Diet").unwrap().median, 0.9);
        // velox never reported SizeRatio; its gene set is simply smaller.
        assert!(velox.gene_stats.get("SizeRatio").is_none());
    }

    #[test]
    fn pellets_of_other_materials_never_contribute() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let pellets = br#"{"pellets": [{"pellets": [
            {"pellet": {"material": "plant", "amount": 5.0}},
            {"pellet": {"material": "Plant ", "amount": 5.0}}
        ]}]}"#;
        let mut archive = build_archive(&[
            (SCENE_ENTRY, scene_entry()),
            (PELLETS_ENTRY, pellets),
            (SPECIES_ENTRY, SPECIES),
        ]);

        let scene = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap();
        // Case and whitespace differences are different materials.
        assert_eq!(scene.pellets.get("Plant").unwrap().count, 0);
        assert_eq!(scene.pellets.get("Plant").unwrap().energy, 0.0);
    }

    #[test]
    fn unknown_species_fails_the_whole_archive() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let good = organism(0, 10.0, &[("Diet", 0.5)]);
        let bad = organism(99, 10.0, &[("Diet", 0.5)]);
        let mut archive = build_archive(&[
            (SCENE_ENTRY, scene_entry()),
            (PELLETS_ENTRY, pellets_entry()),
            (SPECIES_ENTRY, SPECIES),
            ("bibites/good.bb8", &good),
            ("bibites/zz_bad.bb8", &bad),
        ]);

        let err = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::UnknownSpecies { species_id: 99, .. }
        ));
    }

    #[test]
    fn corrupt_organism_fails_the_whole_archive() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let mut archive = build_archive(&[
            (SCENE_ENTRY, scene_entry()),
            (PELLETS_ENTRY, pellets_entry()),
            (SPECIES_ENTRY, SPECIES),
            ("bibites/bad.bb8", b"{\"genes\": {"),
        ]);

        let err = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap_err();
        assert!(matches!(err, AggregateError::Decode { .. }));
    }

    #[test]
    fn untracked_material_without_config_fails() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let mut archive = build_archive(&[
            (SCENE_ENTRY, scene_entry()),
            (PELLETS_ENTRY, pellets_entry()),
            (SPECIES_ENTRY, SPECIES),
        ]);
        let materials = vec!["Plutonium".to_owned()];
        assert!(matches!(
            aggregate(&settings, &catalog, &mut archive, &materials),
            Err(AggregateError::UnknownMaterial { .. })
        ));
    }

    #[test]
    fn birth_maturity_is_sampled_when_both_genes_exist() {
        let organism_doc = Organism {
            species_id: 0,
            total_energy: 1.0,
            genes: [("HatchTime".to_owned(), 3.0), ("BroodTime".to_owned(), 2.0)]
                .into_iter()
                .collect(),
        };
        assert_eq!(birth_maturity(&organism_doc), Some(2.25));

        let zero_brood = Organism {
            species_id: 0,
            total_energy: 1.0,
            genes: [("HatchTime".to_owned(), 3.0), ("BroodTime".to_owned(), 0.0)]
                .into_iter()
                .collect(),
        };
        assert_eq!(birth_maturity(&zero_brood), None);
    }

    #[test]
    fn missing_n_bibites_falls_back_to_record_count() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let a = organism(0, 10.0, &[]);
        let mut archive = build_archive(&[
            (SCENE_ENTRY, br#"{"simulatedTime": 5.0}"#),
            (PELLETS_ENTRY, br#"{"pellets": []}"#),
            (SPECIES_ENTRY, SPECIES),
            ("bibites/a.bb8", &a),
        ]);
        let scene = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap();
        assert_eq!(scene.total_organism_count, 1);
    }

    // Cross-checks the gene reduction against a naive reference over the
    // exact organisms of one species.
    #[test]
    fn gene_stats_match_reference_reduction() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        let catalog = parse_catalog(SPECIES).unwrap();
        let values = [0.9_f64, 0.1, 0.5, 0.7];
        let records: Vec<Vec<u8>> = values
            .iter()
            .map(|v| organism(1, 1.0, &[("SpeedRatio", *v)]))
            .collect();
        let mut entries: Vec<(String, &[u8])> = vec![
            (SCENE_ENTRY.to_owned(), scene_entry()),
            (PELLETS_ENTRY.to_owned(), pellets_entry()),
            (SPECIES_ENTRY.to_owned(), SPECIES),
        ];
        for (i, record) in records.iter().enumerate() {
            entries.push((format!("bibites/o{i}.bb8"), record.as_slice()));
        }
        let borrowed: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, payload)| (name.as_str(), *payload))
            .collect();
        let mut archive = build_archive(&borrowed);

        let scene = aggregate(&settings, &catalog, &mut archive, &tracked()).unwrap();
        let stats = scene
            .species
            .get("Bibus velox")
            .unwrap()
            .gene_stats
            .get("SpeedRatio")
            .unwrap();

        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);
        assert_eq!(stats.mean, values.iter().sum::<f64>() / 4.0);
        assert_eq!(stats.median, f64::midpoint(sorted[1], sorted[2]));
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.max, 0.9);
    }

    #[test]
    fn ensure_catalog_entry_shape_is_reusable() {
        // Guards the serde rename contract the aggregator depends on.
        let entry: SpeciesCatalogEntry = serde_json::from_str(
            r#"{"speciesID": 2, "genericName": "Bibus", "specificName": "parvus"}"#,
        )
        .unwrap();
        assert_eq!(entry.display_name(), "Bibus parvus");
    }
}
