//! Configuration file parsing and discovery

use anyhow::Context as _;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["chunk.yml", "chunk.yaml"];

/// Settings read from chunk.yml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Chunk size used when `split -size` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Placed between a file name and its chunk index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Directory receiving the chunks, instead of next to each file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Config {
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or("_")
    }
}

/// Find the configuration file starting from a specific directory and going up
pub fn find_config_file_from(start_dir: PathBuf) -> Option<PathBuf> {
    let mut current_dir = start_dir;
    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// The configuration file in the user's config directory, if there is one
fn user_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "chunk")?;
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dirs.config_dir().join(name))
        .find(|path| path.is_file())
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> anyhow::Result<Config> {
    // An empty file is a valid, empty configuration
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Load the explicit configuration file, or the first one found
///
/// Having no configuration file at all is fine, an explicit one must exist.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => env::current_dir()
            .ok()
            .and_then(find_config_file_from)
            .or_else(user_config_file),
    };
    match path {
        Some(path) => {
            let config = parse_config_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}
