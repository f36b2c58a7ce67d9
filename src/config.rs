//! Configuration
//!
//! Layered configuration built with the `config` crate: built-in defaults,
//! then `$XDG_CONFIG_HOME/agent-sop/config.toml` (or a file given with
//! `--config`), then `AGENT_SOP_*` environment variables.

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::document::ValidationPolicy;
use crate::error::SopError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SopConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub object_store: ObjectStoreSettings,

    #[serde(default)]
    pub validation: ValidationPolicy,
}

/// Default source precedence. Command-line values are placed in front of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Source tokens such as `type=s3,bucket=team-sops`.
    #[serde(default)]
    pub sop_sources: Vec<String>,

    /// Colon-separated directories.
    #[serde(default)]
    pub sop_paths: Option<String>,

    #[serde(default = "default_true")]
    pub include_builtin: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sop_sources: Vec::new(),
            sop_paths: None,
            include_builtin: true,
        }
    }
}

/// Network behaviour of object storage sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreSettings {
    /// Per-attempt timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Fetches kept in flight per object storage source.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    5000
}

fn default_fetch_concurrency() -> usize {
    4
}

impl Default for ObjectStoreSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl SopConfig {
    pub fn validate(&self) -> Result<(), SopError> {
        let store = &self.object_store;
        if store.timeout_secs == 0 {
            return Err(SopError::ConfigError(
                "object_store.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if store.max_attempts == 0 {
            return Err(SopError::ConfigError(
                "object_store.max_attempts must be greater than 0".to_string(),
            ));
        }
        if store.fetch_concurrency == 0 {
            return Err(SopError::ConfigError(
                "object_store.fetch_concurrency must be greater than 0".to_string(),
            ));
        }
        if store.initial_backoff_ms > store.max_backoff_ms {
            return Err(SopError::ConfigError(format!(
                "object_store.initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                store.initial_backoff_ms, store.max_backoff_ms
            )));
        }
        Ok(())
    }
}
