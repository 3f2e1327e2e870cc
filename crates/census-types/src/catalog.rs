//! Material configuration and the species catalog.
//!
//! Both are rebuilt fresh for every archive: autosaves are not assumed to
//! share configuration across runs, even though in practice they do within
//! one run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-material settings read verbatim from the run's settings document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    /// Energy contributed per unit of pellet amount.
    #[serde(rename = "energyDensity")]
    pub energy_density: f64,
}

/// Mapping from material settings key to [`MaterialSettings`].
///
/// The upstream format keys the table as `"<Material>Settings"` (e.g.
/// `PlantSettings` for the `Plant` material), so [`energy_density`] tries
/// the suffixed key first and falls back to the bare material name.
///
/// [`energy_density`]: MaterialConfig::energy_density
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialConfig {
    /// Raw settings table, keyed exactly as the settings document keys it.
    pub materials: BTreeMap<String, MaterialSettings>,
}

impl MaterialConfig {
    /// Look up the energy density for a material name such as `"Plant"`.
    ///
    /// Tries `"<material>Settings"` first, then the bare name. Returns
    /// `None` when the material is not configured.
    pub fn energy_density(&self, material: &str) -> Option<f64> {
        let suffixed = format!("{material}Settings");
        self.materials
            .get(&suffixed)
            .or_else(|| self.materials.get(material))
            .map(|settings| settings.energy_density)
    }
}

/// One recorded-species entry from the archive's species catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCatalogEntry {
    /// Numeric species identifier referenced by organism records.
    #[serde(rename = "speciesID")]
    pub species_id: i64,
    /// Genus-level name.
    #[serde(rename = "genericName")]
    pub generic_name: String,
    /// Species-level name.
    #[serde(rename = "specificName")]
    pub specific_name: String,
}

impl SpeciesCatalogEntry {
    /// The stable display name: `"<genericName> <specificName>"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.generic_name, self.specific_name)
    }
}

/// Lookup table from species ID to catalog entry, built once per archive.
///
/// Duplicate IDs are last-write-wins: the upstream format does not document
/// a uniqueness guarantee, so the later record overwrites the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesCatalog {
    entries: BTreeMap<i64, SpeciesCatalogEntry>,
}

impl SpeciesCatalog {
    /// Build a catalog from the recorded-species list.
    pub fn from_entries(entries: impl IntoIterator<Item = SpeciesCatalogEntry>) -> Self {
        let mut map = BTreeMap::new();
        for entry in entries {
            map.insert(entry.species_id, entry);
        }
        Self { entries: map }
    }

    /// Resolve a species ID to its display name.
    ///
    /// Returns `None` when the ID is absent from the catalog; the caller
    /// treats that as a corrupt archive, never as a skippable row.
    pub fn resolve(&self, species_id: i64) -> Option<String> {
        self.entries
            .get(&species_id)
            .map(SpeciesCatalogEntry::display_name)
    }

    /// Number of recorded species in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no species.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
