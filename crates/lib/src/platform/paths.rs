use std::path::PathBuf;

use crate::consts::{APP_NAME, CONFIG_ENV, CONFIG_FILENAME, TEMP_DIR_ENV};

/// Returns the user's home directory, if the environment names one
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory, if the environment names one
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> Option<PathBuf> {
  std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_NAME))
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> Option<PathBuf> {
  let config_home = std::env::var_os("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(|| home_dir().map(|home| home.join(".config")))?;
  Some(config_home.join(APP_NAME))
}

/// Config file named by `SHIPREPORT_CONFIG`, if the variable is set.
pub fn env_config_file() -> Option<PathBuf> {
  std::env::var_os(CONFIG_ENV)
    .filter(|value| !value.is_empty())
    .map(PathBuf::from)
}

/// Config file in the per-user config directory. It may not exist.
pub fn user_config_file() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Returns the directory under which per-run extraction directories are created
pub fn temp_root() -> PathBuf {
  std::env::var_os(TEMP_DIR_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(std::env::temp_dir)
}
