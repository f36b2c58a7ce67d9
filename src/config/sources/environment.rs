//! Environment variable source: AGENT_SOP_ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "AGENT_SOP";

/// Add environment variable overlay to builder.
///
/// `AGENT_SOP_SOURCES__SOP_PATHS=/a:/b` sets `sources.sop_paths`. The
/// `sources.sop_sources` list is split on `;` because tokens contain commas.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(";")
            .with_list_parse_key("sources.sop_sources"),
    );
    Ok(builder)
}
