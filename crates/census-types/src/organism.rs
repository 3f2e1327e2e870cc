//! The ephemeral per-organism census record.
//!
//! One [`Organism`] is read from one record file inside an archive,
//! accumulated into per-species statistics, and then discarded. It is never
//! retained past aggregation.

use std::collections::BTreeMap;

/// One simulated creature as seen by the census.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// Reference into the species catalog.
    pub species_id: i64,
    /// Total stored energy reported by the organism's body.
    pub total_energy: f64,
    /// Named numeric gene values. Gene sets may differ between organisms
    /// when the simulation changes gene definitions mid-run; this is
    /// tolerated, not normalized.
    pub genes: BTreeMap<String, f64>,
}

impl Organism {
    /// Look up a single gene value by name.
    pub fn gene(&self, name: &str) -> Option<f64> {
        self.genes.get(name).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gene_lookup() {
        let organism = Organism {
            species_id: 3,
            total_energy: 120.0,
            genes: BTreeMap::from([("Diet".to_owned(), 0.25)]),
        };
        assert_eq!(organism.gene("Diet"), Some(0.25));
        assert_eq!(organism.gene("SizeRatio"), None);
    }
}
