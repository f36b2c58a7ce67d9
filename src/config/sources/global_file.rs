//! Config file source: the global XDG file, or a file named on the command line.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Add the global config file if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::config_file_path() {
        Ok(path) => {
            debug!(path = %path.display(), "Global config file");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        Err(_) => Ok(builder),
    }
}

/// Add an explicitly named config file. It must exist.
pub fn add_explicit(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Message(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path.to_path_buf()).required(true)))
}
