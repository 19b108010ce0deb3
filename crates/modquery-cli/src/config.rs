//! Layered configuration.
//!
//! Settings are merged from, in increasing precedence:
//! 1. Global defaults (`<config_dir>/modquery/config.toml`)
//! 2. Project config (`.modquery.toml` in the working directory)
//! 3. Command-line flags
//!
//! Missing files are skipped. Invalid TOML in any layer is an error.

use std::fs;
use std::path::{Path, PathBuf};

use modquery_core::EnumerationLimits;
use serde::Deserialize;

use crate::error::{CliError, Result};
use crate::render::Charset;

/// File name of the project-local configuration.
pub const LOCAL_CONFIG_FILE: &str = ".modquery.toml";

/// One configuration layer; unset keys defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Snapshot document to query.
    pub snapshot: Option<PathBuf>,
    pub charset: Option<Charset>,
    pub include_unused: Option<bool>,
    pub max_paths: Option<usize>,
    pub max_steps: Option<usize>,
}

impl QueryConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| CliError::Config {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: QueryConfig) {
        self.snapshot = other.snapshot.or(self.snapshot.take());
        self.charset = other.charset.or(self.charset);
        self.include_unused = other.include_unused.or(self.include_unused);
        self.max_paths = other.max_paths.or(self.max_paths);
        self.max_steps = other.max_steps.or(self.max_steps);
    }

    pub fn limits(&self) -> EnumerationLimits {
        let defaults = EnumerationLimits::default();
        EnumerationLimits {
            max_paths: self.max_paths.unwrap_or(defaults.max_paths),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
        }
    }
}

/// Loads and merges the configuration layers.
pub struct ConfigResolver {
    /// Directory searched for the project config.
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform directory from `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    #[cfg(test)]
    pub fn with_global_config_dir(root: PathBuf, global_config_dir: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("modquery"))
    }

    /// Merge the global and project layers.
    pub fn resolve(&self) -> Result<QueryConfig> {
        let mut config = QueryConfig::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join("config.toml");
            match load_layer(&global_config_path)? {
                Some(layer) => {
                    tracing::debug!(?global_config_path, "Loaded global config");
                    config.merge(layer);
                }
                None => tracing::debug!(?global_config_path, "No global config found"),
            }
        }

        let local_config_path = self.root.join(LOCAL_CONFIG_FILE);
        if let Some(layer) = load_layer(&local_config_path)? {
            tracing::debug!(?local_config_path, "Loaded project config");
            config.merge(layer);
        }

        Ok(config)
    }
}

/// Parse one layer; relative snapshot paths are taken relative to the file.
fn load_layer(path: &Path) -> Result<Option<QueryConfig>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let mut layer = QueryConfig::parse(&content, path)?;
    if let (Some(snapshot), Some(dir)) = (&layer.snapshot, path.parent()) {
        if snapshot.is_relative() {
            layer.snapshot = Some(dir.join(snapshot));
        }
    }
    Ok(Some(layer))
}
