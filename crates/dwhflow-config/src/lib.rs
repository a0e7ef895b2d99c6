//! dwhflow configuration
//!
//! Finds the `dwh.kdl` config file and parses it into a [`DwhConfig`].

pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::parse_config_str;

use std::path::{Path, PathBuf};

/// Environment variable naming the config file directly
pub const CONFIG_PATH_ENV: &str = "DWH_CONFIG_PATH";

/// File names searched in a directory, highest priority first
const CANDIDATES: [&str; 2] = ["dwh.local.kdl", "dwh.kdl"];

/// Locate the config file
///
/// Search order:
/// 1. `explicit` (from `--config`)
/// 2. environment variable `DWH_CONFIG_PATH`
/// 3. current directory: dwh.local.kdl, dwh.kdl
/// 4. `./.dwhflow/` directory, same order
/// 5. `~/.config/dwhflow/dwh.kdl`
pub fn find_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }

    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV)
        && !config_path.is_empty()
    {
        return existing(PathBuf::from(config_path));
    }

    let current_dir = std::env::current_dir()?;
    for dir in [current_dir.clone(), current_dir.join(".dwhflow")] {
        if let Some(path) = CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
        {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("dwhflow").join("dwh.kdl");
        if global_config.is_file() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigNotFound)
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::PathNotFound(path))
    }
}

/// Find and parse the config file
pub fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, DwhConfig)> {
    let path = find_config_file(explicit)?;
    tracing::debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config_str(&content)?;
    Ok((path, config))
}
