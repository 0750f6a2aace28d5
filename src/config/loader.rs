// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the optional project file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "Assetflow.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, apply defaults and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Configuration for a project rooted at `root`.
///
/// Uses `root/Assetflow.toml` when present, built-in defaults otherwise.
pub fn load_for_root(root: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = config_path(root);
    if path.is_file() {
        info!(path = ?path, "loading project config");
        load_and_validate(&path)
    } else {
        debug!(path = ?path, "no project config; using built-in layout");
        ConfigFile::try_from(RawConfigFile::default())
    }
}

pub fn config_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(CONFIG_FILE_NAME)
}
