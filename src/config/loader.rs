use std::fs;
use std::path::{Path, PathBuf};

use super::core::BasketmapConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".basketmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_config(contents: &str) -> Result<BasketmapConfig> {
    let config = toml::from_str::<BasketmapConfig>(contents)
        .map_err(|e| Error::config(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))?;

    if let Some(shuffle) = &config.shuffle {
        if shuffle.spill_threshold == Some(0) {
            return Err(Error::config("shuffle.spill_threshold must be greater than 0"));
        }
    }

    Ok(config)
}

/// Load a config file the user named explicitly; any failure is an error.
pub fn load_config_from(path: &Path) -> Result<BasketmapConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::io_with_path("Failed to read config file", path, e))?;
    let config = parse_config(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Try loading an auto-discovered config; problems are logged, not raised.
fn try_load_config_from_path(config_path: &Path) -> Option<BasketmapConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // Only log actual errors, not "file not found"
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// `start` followed by its ancestors, at most `max_depth` directories
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.basketmap.toml`.
pub fn discover_config(start: PathBuf) -> BasketmapConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            BasketmapConfig::default()
        })
}

/// Load the explicit config if given, otherwise search from the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<BasketmapConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    match std::env::current_dir() {
        Ok(current) => Ok(discover_config(current)),
        Err(e) => {
            tracing::warn!("Failed to get current directory: {}. Using default config.", e);
            Ok(BasketmapConfig::default())
        }
    }
}
