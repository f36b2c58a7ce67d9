//! Built-in defaults, the lowest layer of every merge.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("sources.include_builtin", true)?
        .set_default("object_store.timeout_secs", 10)?
        .set_default("object_store.max_attempts", 3)?
        .set_default("object_store.initial_backoff_ms", 200)?
        .set_default("object_store.max_backoff_ms", 5000)?
        .set_default("object_store.fetch_concurrency", 4)?
        .set_default("validation.allow_empty", true)?
        .set_default("validation.require_overview", false)
}
