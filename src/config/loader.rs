//! Configuration loading and discovery for `mapsmith.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::MapsmithConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "mapsmith.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse mapsmith.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override sprite asset directory
    pub assets: Option<PathBuf>,
    /// Override mod directory
    pub mods: Option<PathBuf>,
    /// Override cell size
    pub cell_size: Option<u32>,
    /// Override mirrored editing
    pub mirror_x: Option<bool>,
}

/// Find mapsmith.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for mapsmith.toml
/// 2. Check XDG_CONFIG_HOME/mapsmith/mapsmith.toml (or ~/.config/mapsmith/mapsmith.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find mapsmith.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("mapsmith").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find mapsmith.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<MapsmithConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            tracing::debug!("no mapsmith.toml found, using defaults");
            Ok(MapsmithConfig::default())
        }
    }
}

/// Load configuration from a specific file path.
///
/// Relative paths inside the file are resolved against its directory.
fn load_config_file(path: &Path) -> Result<MapsmithConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: MapsmithConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = project_root(path) {
        config.resolve_paths(root);
    }
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut MapsmithConfig, overrides: &CliOverrides) {
    if let Some(ref assets) = overrides.assets {
        config.catalog.assets = assets.clone();
    }
    if let Some(ref mods) = overrides.mods {
        config.catalog.mods = mods.clone();
    }
    if let Some(cell_size) = overrides.cell_size {
        config.editor.cell_size = cell_size;
    }
    if let Some(mirror_x) = overrides.mirror_x {
        config.editor.mirror_x = mirror_x;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
