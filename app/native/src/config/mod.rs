//! Configuration module for Zonesnap.
//!
//! This module provides configuration types, loading functionality, and file watching
//! for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;
mod watcher;

use std::fs;
use std::path::{Path, PathBuf};

pub use types::{TimingConfig, ZoneSnapConfig};
pub use watcher::{ConfigWatcher, watch_config_file};

use crate::constants::APP_DIR_NAME;

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/zonesnap/config.jsonc, \
         the platform config directory, or ~/.zonesnap.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".zonesnap.jsonc", ".zonesnap.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/zonesnap/` if set
/// 2. `~/.config/zonesnap/`
/// 3. the platform config directory (`dirs::config_dir()`)
/// 4. `~/.zonesnap.jsonc` or `~/.zonesnap.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let mut push_dir = |dir: PathBuf, paths: &mut Vec<PathBuf>| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join(APP_DIR_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_DIR_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_DIR_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(ZoneSnapConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `IoError` if it
/// cannot be read and `ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(ZoneSnapConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: ZoneSnapConfig = serde_json::from_reader(reader)?;

    Ok((config, path.to_path_buf()))
}

/// Loads the configuration, falling back to defaults on any failure.
///
/// Returns the configuration and the path it was read from, if any.
#[must_use]
pub fn load_or_default(custom_path: Option<&Path>) -> (ZoneSnapConfig, Option<PathBuf>) {
    let result = custom_path.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), zones = config.zones.len(), "loaded configuration");
            (config, Some(path))
        }
        Err(ConfigError::NotFound) => {
            tracing::info!("no configuration file found, using defaults");
            (ZoneSnapConfig::default(), custom_path.map(Path::to_path_buf))
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            (ZoneSnapConfig::default(), custom_path.map(Path::to_path_buf))
        }
    }
}
