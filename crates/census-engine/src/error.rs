//! Error types for the census engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps the failure
//! modes of engine startup. Per-archive failures never reach it: the
//! controller logs them and keeps watching.

/// Top-level error for the census engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The autosave directory watcher could not be started.
    #[error("watch error: {source}")]
    Watch {
        /// The underlying watch error.
        #[from]
        source: crate::watch::WatchError,
    },

    /// The startup catch-up scan failed to read the autosave directory.
    #[error("catch-up scan failed: {source}")]
    CatchUp {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
