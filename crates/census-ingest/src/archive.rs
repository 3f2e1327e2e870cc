//! Access to one autosave archive.
//!
//! An autosave is a zip bundle containing the settings, scene, pellet, and
//! species-catalog documents plus one record file per organism under
//! `bibites/`. [`SaveArchive`] also accepts an already-extracted save
//! directory with the same layout, which is convenient for tests and for
//! manual reprocessing.
//!
//! Zip bundles are read fully into memory (autosaves are small) so the
//! archive type stays free of reader lifetimes.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;

/// Archive entry holding the run settings document.
pub const SETTINGS_ENTRY: &str = "settings.bb8settings";
/// Archive entry holding the scene scalars (`simulatedTime`, `nBibites`).
pub const SCENE_ENTRY: &str = "scene.bb8scene";
/// Archive entry holding the pellet zone structure.
pub const PELLETS_ENTRY: &str = "pellets.bb8scene";
/// Archive entry holding the recorded-species catalog.
pub const SPECIES_ENTRY: &str = "speciesData.json";
/// Directory inside the archive holding one record file per organism.
pub const ORGANISM_DIR: &str = "bibites";
/// File extension of organism record files.
pub const ORGANISM_EXT: &str = ".bb8";

/// One autosave, either as a zip bundle or an extracted directory.
#[derive(Debug)]
pub struct SaveArchive {
    inner: ArchiveInner,
}

#[derive(Debug)]
enum ArchiveInner {
    Zip(Box<zip::ZipArchive<Cursor<Vec<u8>>>>),
    Dir(PathBuf),
}

impl SaveArchive {
    /// Open an autosave at a path, dispatching on whether it is a
    /// directory (extracted save) or a file (zip bundle).
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        if path.is_dir() {
            Ok(Self::open_dir(path))
        } else {
            Self::open_zip_path(path)
        }
    }

    /// Open a zip bundle from a file path.
    pub fn open_zip_path(path: &Path) -> Result<Self, ArchiveError> {
        let bytes = std::fs::read(path)?;
        Self::from_zip_bytes(bytes)
    }

    /// Open a zip bundle already held in memory.
    pub fn from_zip_bytes(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self {
            inner: ArchiveInner::Zip(Box::new(archive)),
        })
    }

    /// Wrap an already-extracted save directory.
    pub fn open_dir(path: &Path) -> Self {
        Self {
            inner: ArchiveInner::Dir(path.to_path_buf()),
        }
    }

    /// Read one named entry fully into memory.
    ///
    /// Returns [`ArchiveError::MissingEntry`] when the entry is absent.
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        match &mut self.inner {
            ArchiveInner::Zip(archive) => {
                let mut file = match archive.by_name(name) {
                    Ok(file) => file,
                    Err(zip::result::ZipError::FileNotFound) => {
                        return Err(ArchiveError::MissingEntry {
                            name: name.to_owned(),
                        });
                    }
                    Err(err) => return Err(err.into()),
                };
                let mut buf = Vec::new();
                file.read_to_end(&mut buf)?;
                Ok(buf)
            }
            ArchiveInner::Dir(dir) => {
                let path = dir.join(name);
                match std::fs::read(&path) {
                    Ok(bytes) => Ok(bytes),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        Err(ArchiveError::MissingEntry {
                            name: name.to_owned(),
                        })
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    /// Read every organism record (`bibites/*.bb8`) as `(name, payload)`.
    ///
    /// Entries are returned in lexicographic name order so aggregation is
    /// reproducible. An archive with no organism records yields an empty
    /// list, which aggregates to an empty census rather than an error.
    pub fn organism_records(&mut self) -> Result<Vec<(String, Vec<u8>)>, ArchiveError> {
        let names = self.organism_entry_names()?;
        let mut records = Vec::with_capacity(names.len());
        for name in names {
            let payload = self.read(&name)?;
            records.push((name, payload));
        }
        Ok(records)
    }

    fn organism_entry_names(&self) -> Result<Vec<String>, ArchiveError> {
        let prefix = format!("{ORGANISM_DIR}/");
        let mut names: Vec<String> = match &self.inner {
            ArchiveInner::Zip(archive) => archive
                .file_names()
                .filter(|name| name.starts_with(&prefix) && name.ends_with(ORGANISM_EXT))
                .map(str::to_owned)
                .collect(),
            ArchiveInner::Dir(dir) => {
                let organisms = dir.join(ORGANISM_DIR);
                if !organisms.is_dir() {
                    return Ok(Vec::new());
                }
                let mut found = Vec::new();
                for entry in std::fs::read_dir(&organisms)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let Some(file_name) = file_name.to_str() else {
                        continue;
                    };
                    if file_name.ends_with(ORGANISM_EXT) {
                        found.push(format!("{ORGANISM_DIR}/{file_name}"));
                    }
                }
                found
            }
        };
        names.sort();
        Ok(names)
    }
}

/// Build an in-memory zip bundle from `(name, contents)` pairs.
///
/// Test helper shared by the unit tests of this crate.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
