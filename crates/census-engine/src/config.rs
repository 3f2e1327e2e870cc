//! Configuration loading for the census engine.
//!
//! The canonical configuration lives in `census-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CensusConfig {
    /// Ingestion settings (paths, debounce, catch-up).
    #[serde(default)]
    pub ingest: IngestConfig,

    /// The run identity this process tracks; all other runs are rejected.
    #[serde(default)]
    pub target: TargetConfig,

    /// Pellet materials to account for.
    #[serde(default = "default_materials")]
    pub materials: Vec<String>,

    /// InfluxDB metrics sink settings.
    #[serde(default)]
    pub influx: InfluxConfig,

    /// Export API server settings.
    #[serde(default)]
    pub observer: ObserverConfig,
}

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestConfig {
    /// Directory the simulation writes autosave archives into.
    #[serde(default = "default_autosave_dir")]
    pub autosave_dir: PathBuf,

    /// Optional long-term store; folded archives are copied here.
    #[serde(default)]
    pub retention_dir: Option<PathBuf>,

    /// Seconds to wait after a creation notification before opening the
    /// archive, so the producing process can finish writing.
    #[serde(default = "default_debounce_seconds")]
    pub debounce_seconds: u64,

    /// Process every pre-existing archive in `autosave_dir` on startup,
    /// before live watching begins.
    #[serde(default = "default_true")]
    pub catch_up_on_start: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            autosave_dir: default_autosave_dir(),
            retention_dir: None,
            debounce_seconds: default_debounce_seconds(),
            catch_up_on_start: true,
        }
    }
}

/// The tracked run identity, as two verbatim string tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Scenario name to match (first zone-name token).
    #[serde(default)]
    pub scenario: String,
    /// Run number to match, compared as a string ("007" is not "7").
    #[serde(default)]
    pub run: String,
}

/// InfluxDB v2 write settings. Disabled by default; when disabled the
/// engine logs metric points instead of shipping them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfluxConfig {
    /// Whether to ship points to InfluxDB at all.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the InfluxDB instance.
    #[serde(default = "default_influx_url")]
    pub url: String,
    /// API token.
    #[serde(default)]
    pub token: String,
    /// Organization name.
    #[serde(default)]
    pub org: String,
    /// Destination bucket.
    #[serde(default)]
    pub bucket: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_influx_url(),
            token: String::new(),
            org: String::new(),
            bucket: String::new(),
        }
    }
}

impl InfluxConfig {
    /// Apply environment overrides: `INFLUX_URL` and `INFLUX_TOKEN`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("INFLUX_URL") {
            self.url = url;
        }
        if let Ok(token) = std::env::var("INFLUX_TOKEN") {
            self.token = token;
        }
    }
}

/// Export API server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            target: TargetConfig::default(),
            materials: default_materials(),
            influx: InfluxConfig::default(),
            observer: ObserverConfig::default(),
        }
    }
}

impl CensusConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for Influx credentials:
    /// `INFLUX_URL` and `INFLUX_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.influx.apply_env_overrides();
        Ok(config)
    }
}

fn default_autosave_dir() -> PathBuf {
    PathBuf::from("./autosaves")
}

const fn default_debounce_seconds() -> u64 {
    5
}

const fn default_true() -> bool {
    true
}

fn default_influx_url() -> String {
    String::from("http://localhost:8086")
}

fn default_materials() -> Vec<String> {
    census_ingest::DEFAULT_TRACKED_MATERIALS
        .iter()
        .map(|m| (*m).to_owned())
        .collect()
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}
