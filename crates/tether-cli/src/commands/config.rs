//! `tether config` command - Show where the registry lives.

use std::path::Path;

use anyhow::Result;

use super::utils;
use crate::output;

/// Print the config path, and whether it exists yet.
pub fn run(explicit: Option<&Path>) -> Result<()> {
    let path = utils::config_path(explicit)?;
    output::essential(&path.display().to_string());
    if !path.exists() {
        output::warn("Config file does not exist yet - defaults are in effect");
    }
    Ok(())
}
