//! Append-only time series store for aggregated census scenes.
//!
//! One [`fold`](series::TimeSeriesStore::fold) appends one scene's results:
//! the simulated-time axis grows by one, and every tracked series grows by
//! one in lockstep -- species or materials absent from the scene append a
//! null, and series that first appear mid-run are backfilled with nulls, so
//! all series stay globally aligned by index.
//!
//! # Modules
//!
//! - [`series`] -- the store itself and its per-metric series types.
//! - [`shared`] -- [`SharedStore`], the single-writer/concurrent-reader
//!   wrapper used by the ingestion worker and the export API.

pub mod series;
pub mod shared;

pub use series::{GeneSeries, PelletSeries, SpeciesSeries, TimeSeriesStore};
pub use shared::SharedStore;
