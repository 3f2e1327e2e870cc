//! Species identity resolution.
//!
//! The archive records every species the run has seen in
//! `speciesData.json`. The catalog is parsed once per archive; organism
//! records then resolve their numeric species ID against it. An ID the
//! catalog does not know is a hard error at the aggregation layer, never a
//! skipped row.

use census_types::{SpeciesCatalog, SpeciesCatalogEntry};
use serde::Deserialize;

use crate::decode::decode_into;
use crate::error::DecodeError;

/// Raw shape of `speciesData.json`.
#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[serde(rename = "recordedSpecies", default)]
    recorded_species: Vec<SpeciesCatalogEntry>,
}

/// Parse the recorded-species payload into a lookup catalog.
///
/// Duplicate IDs are last-write-wins, per the catalog's documented policy.
pub fn parse_catalog(raw: &[u8]) -> Result<SpeciesCatalog, DecodeError> {
    let file: SpeciesFile = decode_into(raw)?;
    Ok(SpeciesCatalog::from_entries(file.recorded_species))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_recorded_species() {
        let raw = br#"{"recordedSpecies": [
            {"speciesID": 0, "genericName": "Bibus", "specificName": "communis"},
            {"speciesID": 4, "genericName": "Bibus", "specificName": "velox"}
        ]}"#;
        let catalog = parse_catalog(raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve(0).as_deref(), Some("Bibus communis"));
        assert_eq!(catalog.resolve(4).as_deref(), Some("Bibus velox"));
        assert!(catalog.resolve(7).is_none());
    }

    #[test]
    fn missing_list_is_an_empty_catalog() {
        let catalog = parse_catalog(b"{}").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(parse_catalog(b"{\"recordedSpecies\": [{]}").is_err());
    }
}
