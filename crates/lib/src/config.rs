//! Engine configuration.
//!
//! Every archive layout constant the engine relies on lives here so that a
//! package produced by a differently configured build tool can still be
//! reported on. Files are JSON; missing keys fall back to the defaults in
//! [`crate::consts`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  DEFAULT_PARTITIONS, INNER_PACKAGE_ENTRY, ITEM_PREFIX, ITEM_SUFFIX, MANIFEST_ENTRY, SECURITY_PREFIX, UPDATE_SUFFIX,
};
use crate::platform::paths::{env_config_file, temp_root, user_config_file};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("config must name at least one partition")]
  NoPartitions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
  /// Partitions in processing and output order.
  pub partitions: Vec<String>,
  /// Archive path of the manifest document.
  pub manifest_entry: String,
  /// Archive directory prefix of per-partition item definitions.
  pub item_prefix: String,
  /// File-type suffix stripped from declared item names.
  pub item_suffix: String,
  /// Suffix identifying update wrapper packages.
  pub update_suffix: String,
  /// Entry of an update wrapper that holds the real package.
  pub inner_package_entry: String,
  /// Archive directory prefix of security account entries.
  pub security_prefix: String,
  /// Root for per-run extraction directories.
  pub temp_dir: Option<PathBuf>,
  /// Reconcile partitions on the rayon pool.
  pub parallel: bool,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      partitions: DEFAULT_PARTITIONS.iter().map(|p| p.to_string()).collect(),
      manifest_entry: MANIFEST_ENTRY.to_string(),
      item_prefix: ITEM_PREFIX.to_string(),
      item_suffix: ITEM_SUFFIX.to_string(),
      update_suffix: UPDATE_SUFFIX.to_string(),
      inner_package_entry: INNER_PACKAGE_ENTRY.to_string(),
      security_prefix: SECURITY_PREFIX.to_string(),
      temp_dir: None,
      parallel: false,
    }
  }
}

impl ReportConfig {
  /// Load a config file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config: ReportConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;
    Ok(config)
  }

  /// Resolve the effective config.
  ///
  /// An explicit path, or one named by `SHIPREPORT_CONFIG`, must exist.
  /// Otherwise the per-user config file is used when present, and defaults
  /// apply when it is not.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::from_file(path);
    }
    if let Some(path) = env_config_file() {
      debug!(path = ?path, "loading config from environment");
      return Self::from_file(&path);
    }

    match user_config_file() {
      Some(path) if path.exists() => {
        debug!(path = ?path, "loading config");
        Self::from_file(&path)
      }
      _ => Ok(Self::default()),
    }
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.partitions.is_empty() {
      return Err(ConfigError::NoPartitions);
    }
    Ok(())
  }

  /// Directory under which this run's extraction directory is created.
  pub fn temp_root(&self) -> PathBuf {
    self.temp_dir.clone().unwrap_or_else(temp_root)
  }

  pub fn is_partition(&self, name: &str) -> bool {
    self.partitions.iter().any(|p| p == name)
  }
}
