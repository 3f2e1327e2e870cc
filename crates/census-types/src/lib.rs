//! Shared type definitions for the Bibite Census pipeline.
//!
//! This crate is the single source of truth for the data model that flows
//! through the ingestion pipeline: run identity, material configuration,
//! the species catalog, ephemeral organism records, and the fully aggregated
//! [`Scene`]. Everything here is pure data plus small pure reductions --
//! no I/O, no archive knowledge.
//!
//! # Modules
//!
//! - [`identity`] -- [`RunIdentity`] (scenario + run number) parsed from a
//!   zone name.
//! - [`catalog`] -- [`MaterialConfig`] energy densities and the
//!   [`SpeciesCatalog`] ID-to-name lookup.
//! - [`organism`] -- the ephemeral per-organism census record.
//! - [`stats`] -- [`GeneStats`] summary reduction (mean/median/min/max).
//! - [`scene`] -- one aggregated snapshot: [`PelletStat`],
//!   [`SpeciesSnapshotStat`], [`Scene`].

pub mod catalog;
pub mod identity;
pub mod organism;
pub mod scene;
pub mod stats;

// Re-export all public types at crate root for convenience.
pub use catalog::{MaterialConfig, MaterialSettings, SpeciesCatalog, SpeciesCatalogEntry};
pub use identity::RunIdentity;
pub use organism::Organism;
pub use scene::{PelletStat, Scene, SpeciesSnapshotStat};
pub use stats::GeneStats;
