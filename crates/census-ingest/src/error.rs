//! Error taxonomy for the ingestion path.
//!
//! Every failure mode an archive can produce is a typed variant here, so
//! the controller can log the failure kind instead of swallowing a broad
//! exception. Identity mismatch is deliberately *not* an error: rejecting
//! an archive from an unrelated run is a routing outcome handled by the
//! controller.

/// A snapshot document could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was empty after stripping non-printable bytes.
    #[error("document is empty after cleaning")]
    Empty,

    /// The cleaned text is not valid JSON.
    #[error("JSON syntax error at line {line}, column {column}: {source}")]
    Json {
        /// Line of the underlying syntax error in the cleaned text.
        line: usize,
        /// Column of the underlying syntax error in the cleaned text.
        column: usize,
        /// The underlying parser error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

/// The archive itself could not be opened or read.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Filesystem read failure.
    #[error("archive I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not a readable zip bundle.
    #[error("archive is not a readable zip: {source}")]
    Zip {
        /// The underlying zip error.
        #[from]
        source: zip::result::ZipError,
    },

    /// A file the pipeline requires is absent from the archive.
    #[error("archive is missing required entry {name:?}")]
    MissingEntry {
        /// The entry name that was looked up.
        name: String,
    },
}

/// The run's settings document is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings document could not be decoded at all.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The settings document has no zones, so no identity can be derived.
    #[error("settings document has no zones")]
    NoZones,

    /// The first zone carries no name field.
    #[error("first zone has no name")]
    MissingZoneName,

    /// The zone name does not split into a scenario token and a run token.
    #[error("zone name {name:?} does not split into scenario and run tokens")]
    MalformedZoneName {
        /// The zone name as found in the document.
        name: String,
    },

    /// The settings document has no materials table.
    #[error("settings document has no materials table")]
    MissingMaterials,
}

/// Building a [`Scene`](census_types::Scene) from an archive failed.
///
/// Partial scenes are never emitted: any organism that fails to decode or
/// resolve fails the whole aggregation, because a statistic computed over a
/// silent subset of organisms would corrupt the time series.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Reading an entry from the archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// One of the snapshot documents failed to decode.
    #[error("failed to decode {file:?}: {source}")]
    Decode {
        /// The archive entry that failed.
        file: String,
        /// The underlying decode error.
        #[source]
        source: DecodeError,
    },

    /// An organism references a species ID absent from the catalog.
    ///
    /// A census entity must always be traceable to a species record; this
    /// is treated as a corrupt archive, not a skippable row.
    #[error("organism {file:?} references species ID {species_id} absent from the catalog")]
    UnknownSpecies {
        /// The organism record file.
        file: String,
        /// The unresolvable species ID.
        species_id: i64,
    },

    /// A tracked material has no configured energy density.
    #[error("material {material:?} has no configured energy density")]
    UnknownMaterial {
        /// The tracked material name.
        material: String,
    },
}

/// Umbrella error for processing one archive end to end.
///
/// The controller catches this at the archive boundary, logs it, and keeps
/// watching; it never terminates the process.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The archive could not be opened or read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The run's settings were missing or malformed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The species catalog failed to decode.
    #[error("failed to decode species catalog: {0}")]
    Catalog(#[source] DecodeError),

    /// Scene aggregation failed.
    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
}

impl IngestError {
    /// Short machine-friendly name of the failure kind, for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::Config(_) => "config",
            Self::Catalog(_) => "catalog",
            Self::Aggregate(_) => "aggregate",
        }
    }
}
