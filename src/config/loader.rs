//! Config loading for tailwatch.
//!
//! Loads and validates YAML config files and merges them over the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::discovery::Discovery;
use crate::config::error::ConfigError;
use crate::config::types::{Config, RawConfig};

/// Expand tilde in path to home directory.
///
/// Handles the following cases:
/// - `~/foo` -> `/home/user/foo`
/// - `/absolute/path` -> unchanged
/// - `relative/path` -> unchanged
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    path.to_path_buf()
}

/// Load, parse and validate a YAML config file.
fn load_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let raw: RawConfig = serde_saphyr::from_str(&content)
        .map_err(|e| ConfigError::from_saphyr_error(path.to_path_buf(), e))?;

    validate(path, &raw)?;
    Ok(raw)
}

fn validate(path: &Path, raw: &RawConfig) -> Result<(), ConfigError> {
    if raw.max_lines == Some(0) {
        return Err(ConfigError::Validation {
            path: path.to_path_buf(),
            message: "max_lines must be at least 1".to_string(),
        });
    }
    if raw.max_read_failures == Some(0) {
        return Err(ConfigError::Validation {
            path: path.to_path_buf(),
            message: "max_read_failures must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Load config from a single file over the defaults.
///
/// Used for an explicit `--config` path, where discovery is skipped.
pub fn load_single_file(path: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    config.merge(&load_file(path)?);
    Ok(config)
}

/// Load config from discovered config files.
///
/// The global file is applied first and the project file second, so a
/// project value overrides the global one key by key. Returns the defaults
/// if no config files exist.
pub fn load(discovery: &Discovery) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    for path in discovery.files() {
        let raw = load_file(path)?;
        config.merge(&raw);
    }

    Ok(config)
}
