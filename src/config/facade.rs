//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SopConfig;
use crate::error::SopError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration. An explicit path replaces the global file.
    pub fn load(explicit: Option<&Path>) -> Result<SopConfig, SopError> {
        let config = match explicit {
            Some(path) => MergeService::load_from_file(path)?,
            None => MergeService::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> SopConfig {
        SopConfig::default()
    }
}
