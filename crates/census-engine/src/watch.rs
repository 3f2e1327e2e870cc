//! Autosave directory watcher.
//!
//! Bridges `notify`'s threaded callback API into an async channel: the
//! callback runs on the watcher's own thread and pushes matching paths
//! through a bounded `tokio` channel with `blocking_send`. Only creation
//! events for `.zip` files pass the filter; the simulation writes each
//! autosave exactly once and never modifies it afterwards.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

/// Errors that can occur when starting the directory watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The underlying filesystem watcher failed.
    #[error("filesystem watcher error: {source}")]
    Notify {
        /// The underlying notify error.
        #[from]
        source: notify::Error,
    },
}

/// Watches one directory and yields newly created autosave archives.
pub struct AutosaveWatcher {
    // Held only to keep the watch alive; dropping it stops the stream.
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PathBuf>,
}

impl AutosaveWatcher {
    /// Start watching `dir` (non-recursively) for new `.zip` archives.
    pub fn start(dir: &Path) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(64);

        let mut watcher =
            notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
                match result {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Create(_)) {
                            return;
                        }
                        for path in event.paths {
                            if is_archive_path(&path) && tx.blocking_send(path).is_err() {
                                // Receiver gone; the engine is shutting down.
                                return;
                            }
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "filesystem watch event error");
                    }
                }
            })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait for the next created archive path.
    ///
    /// Returns `None` only if the watcher thread has gone away.
    pub async fn next(&mut self) -> Option<PathBuf> {
        self.rx.recv().await
    }
}

/// Whether a created path looks like an autosave archive.
fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}
