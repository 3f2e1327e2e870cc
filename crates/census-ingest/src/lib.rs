//! Savefile ingestion for the Bibite Census pipeline.
//!
//! This crate turns one autosave archive into one aggregated
//! [`Scene`](census_types::Scene): it locates and defensively decodes the
//! loosely-formed JSON documents inside the archive, reconciles the run's
//! configuration with the organism census, and computes per-species and
//! per-material statistics.
//!
//! # Modules
//!
//! - [`decode`] -- strips stray non-printable bytes and parses JSON.
//! - [`archive`] -- [`SaveArchive`] access to a zip bundle or an
//!   already-extracted save directory.
//! - [`settings`] -- [`RunSettings`]: run identity plus material config.
//! - [`species`] -- species catalog parsing.
//! - [`aggregate`] -- the scene aggregator.
//! - [`error`] -- the typed error taxonomy for the whole ingestion path.
//!
//! [`SaveArchive`]: archive::SaveArchive
//! [`RunSettings`]: settings::RunSettings

pub mod aggregate;
pub mod archive;
pub mod decode;
pub mod error;
pub mod settings;
pub mod species;

pub use aggregate::{DEFAULT_TRACKED_MATERIALS, aggregate};
pub use archive::SaveArchive;
pub use error::{AggregateError, ArchiveError, ConfigError, DecodeError, IngestError};
pub use settings::RunSettings;
pub use species::parse_catalog;
