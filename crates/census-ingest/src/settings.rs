//! Run configuration reader.
//!
//! Parses the archive's settings document into [`RunSettings`]: the
//! material energy-density table plus the run identity derived from the
//! first zone's name. Validation happens once, here at the boundary, so
//! the rest of the pipeline works with typed records instead of string
//! lookups into an untyped document.

use census_types::{MaterialConfig, RunIdentity};
use serde::Deserialize;

use crate::decode::decode_into;
use crate::error::ConfigError;

/// Typed view of the run's settings: identity plus material config.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Which scenario/run this archive belongs to.
    pub identity: RunIdentity,
    /// Material energy densities, immutable once loaded per archive.
    pub materials: MaterialConfig,
}

/// Raw shape of the settings document; only the fields the census needs.
#[derive(Debug, Deserialize)]
struct SettingsDoc {
    #[serde(default)]
    materials: Option<MaterialConfig>,
    #[serde(default)]
    zones: Vec<ZoneDoc>,
}

#[derive(Debug, Deserialize)]
struct ZoneDoc {
    #[serde(default)]
    name: Option<String>,
}

impl RunSettings {
    /// Parse a raw settings payload.
    ///
    /// Fails with [`ConfigError`] if the zones list is empty, the first
    /// zone's name has fewer than two space-separated tokens, or the
    /// materials table is absent.
    pub fn parse(raw: &[u8]) -> Result<Self, ConfigError> {
        let doc: SettingsDoc = decode_into(raw)?;

        let materials = doc.materials.ok_or(ConfigError::MissingMaterials)?;

        let zone = doc.zones.first().ok_or(ConfigError::NoZones)?;
        let name = zone.name.as_deref().ok_or(ConfigError::MissingZoneName)?;
        let identity =
            RunIdentity::from_zone_name(name).ok_or_else(|| ConfigError::MalformedZoneName {
                name: name.to_owned(),
            })?;

        Ok(Self {
            identity,
            materials,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SETTINGS: &[u8] = br#"{
        "materials": {
            "PlantSettings": {"energyDensity": 10.0},
            "MeatSettings": {"energyDensity": 37.5}
        },
        "zones": [{"name": "Control 3"}, {"name": "Unused 9"}]
    }"#;

    #[test]
    fn parses_identity_and_materials() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        assert_eq!(settings.identity, RunIdentity::new("Control", "3"));
        assert_eq!(settings.materials.energy_density("Plant"), Some(10.0));
        assert_eq!(settings.materials.energy_density("Meat"), Some(37.5));
    }

    #[test]
    fn only_the_first_zone_names_the_run() {
        let settings = RunSettings::parse(SETTINGS).unwrap();
        assert_ne!(settings.identity.scenario, "Unused");
    }

    #[test]
    fn empty_zones_fail() {
        let raw = br#"{"materials": {}, "zones": []}"#;
        assert!(matches!(
            RunSettings::parse(raw),
            Err(ConfigError::NoZones)
        ));
    }

    #[test]
    fn unnamed_zone_fails() {
        let raw = br#"{"materials": {}, "zones": [{}]}"#;
        assert!(matches!(
            RunSettings::parse(raw),
            Err(ConfigError::MissingZoneName)
        ));
    }

    #[test]
    fn single_token_zone_name_fails() {
        let raw = br#"{"materials": {}, "zones": [{"name": "Control"}]}"#;
        assert!(matches!(
            RunSettings::parse(raw),
            Err(ConfigError::MalformedZoneName { .. })
        ));
    }

    #[test]
    fn missing_materials_fail() {
        let raw = br#"{"zones": [{"name": "Control 3"}]}"#;
        assert!(matches!(
            RunSettings::parse(raw),
            Err(ConfigError::MissingMaterials)
        ));
    }

    #[test]
    fn control_bytes_in_settings_are_tolerated() {
        let mut dirty = Vec::from(&b"\x00\x01"[..]);
        dirty.extend_from_slice(SETTINGS);
        let settings = RunSettings::parse(&dirty).unwrap();
        assert_eq!(settings.identity.to_string(), "Control 3");
    }
}
