//! Summary statistics over per-gene sample lists.
//!
//! [`GeneStats`] is the reduction applied once per species per gene after a
//! snapshot's organisms have been consumed: arithmetic mean, median (average
//! of the two middle values for even counts), and the literal extremes.

use serde::{Deserialize, Serialize};

/// Mean, median, min, and max of one gene's values across one species in
/// one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneStats {
    /// Arithmetic average of the samples.
    pub mean: f64,
    /// Middle value of the sorted samples (average of the two middle values
    /// when the count is even).
    pub median: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
}

impl GeneStats {
    /// Reduce a sample list to its summary statistics.
    ///
    /// Returns `None` for an empty list. Structurally the aggregator never
    /// produces an empty list (a species+gene entry only exists once at
    /// least one organism contributed), so callers may skip `None` without
    /// an epsilon policy.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let first = samples.first()?;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let sum: f64 = sorted.iter().sum();
        let mean = sum / (sorted.len() as f64);

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            let lower = sorted.get(mid.wrapping_sub(1)).copied().unwrap_or(*first);
            let upper = sorted.get(mid).copied().unwrap_or(*first);
            f64::midpoint(lower, upper)
        } else {
            sorted.get(mid).copied().unwrap_or(*first)
        };

        let min = sorted.first().copied().unwrap_or(*first);
        let max = sorted.last().copied().unwrap_or(*first);

        Some(Self {
            mean,
            median,
            min,
            max,
        })
    }
}
