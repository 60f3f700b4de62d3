use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tether_core::Config;

/// Resolve the config path: explicit flag (or `TETHER_CONFIG`), else XDG.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path().context("Cannot locate config file"),
    }
}

/// Load the config, falling back to defaults when the file is missing.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = config_path(explicit)?;
    let config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((config, path))
}
