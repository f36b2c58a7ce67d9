//! XDG Base Directory lookups for the configuration file.

use crate::error::SopError;
use std::path::PathBuf;

const APP_DIR: &str = "agent-sop";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, SopError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        SopError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Path of the global configuration file: `$XDG_CONFIG_HOME/agent-sop/config.toml`.
pub fn config_file_path() -> Result<PathBuf, SopError> {
    Ok(config_home()?.join(APP_DIR).join("config.toml"))
}
