//! Logging System
//!
//! Structured logging through `tracing`. Level, format, and destination come
//! from (highest first) command-line flags, `AGENT_SOP_LOG*` environment
//! variables, the `[logging]` config section, then defaults. Logs never go
//! to stdout by default because the prompt server speaks its protocol there.

use crate::error::SopError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_LOG: &str = "AGENT_SOP_LOG";
const ENV_LOG_FORMAT: &str = "AGENT_SOP_LOG_FORMAT";
const ENV_LOG_OUTPUT: &str = "AGENT_SOP_LOG_OUTPUT";
const ENV_LOG_FILE: &str = "AGENT_SOP_LOG_FILE";
const ENV_LOG_MODULES: &str = "AGENT_SOP_LOG_MODULES";

/// Resolve the log file path with precedence: CLI, AGENT_SOP_LOG_FILE env, config file, default.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, SopError> {
    if let Some(p) = cli_file.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    if let Ok(env_path) = std::env::var(ENV_LOG_FILE) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf, SopError> {
    let project_dirs =
        directories::ProjectDirs::from("", "agent-sop", "agent-sop").ok_or_else(|| {
            SopError::ConfigError(
                "Could not determine platform state directory for log file".to_string(),
            )
        })?;
    // macOS and Windows have no state dir; fall back to the data dir there.
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir())
        .to_path_buf();
    Ok(dir.join("agent-sop.log"))
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means use runtime default
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, terminal outputs only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,

    /// Command-line flags; these outrank the environment.
    #[serde(skip)]
    pub cli: CliLogOverrides,
}

/// Logging flags given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliLogOverrides {
    pub level: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
            cli: CliLogOverrides::default(),
        }
    }
}

impl LoggingConfig {
    /// Record command-line flags. They win over `AGENT_SOP_LOG*` variables,
    /// which in turn win over the configured values.
    pub fn with_overrides(
        mut self,
        level: Option<&str>,
        format: Option<&str>,
        output: Option<&str>,
        file: Option<PathBuf>,
    ) -> Self {
        self.cli = CliLogOverrides {
            level: level.map(str::to_string),
            format: format.map(str::to_string),
            output: output.map(str::to_string),
            file: file.filter(|p| !p.as_os_str().is_empty()),
        };
        self
    }

    /// Whether the effective destination includes stdout.
    pub fn writes_to_stdout(&self) -> Result<bool, SopError> {
        Ok(determine_output(self, &process_env)?.stdout)
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. CLI arguments (`LoggingConfig::cli`)
/// 2. Environment variables (AGENT_SOP_LOG, AGENT_SOP_LOG_FORMAT, etc.)
/// 3. Configuration file
/// 4. Defaults
///
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), SopError> {
    if config.is_some_and(|c| !c.enabled) {
        let _ = Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init();
        return Ok(());
    }

    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    let filter = build_env_filter(config, &process_env)?;
    let format = determine_format(config, &process_env)?;
    let output = determine_output(config, &process_env)?;
    let color = config.color && !output.file;

    let writer = if output.file {
        let path = resolve_log_file_path(config.cli.file.clone(), config.file.clone())?;
        let file = open_log_file(&path)?;
        let file_writer = Mutex::new(file);
        if output.stderr {
            BoxMakeWriter::new(file_writer.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file_writer)
        }
    } else if output.stdout && output.stderr {
        BoxMakeWriter::new(std::io::stdout.and(std::io::stderr))
    } else if output.stdout {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    let base = Registry::default().with(filter);
    let result = if format == "json" {
        base.with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(writer),
        )
        .try_init()
    } else {
        base.with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(color)
                .with_writer(writer),
        )
        .try_init()
    };
    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }

    Ok(())
}

fn open_log_file(path: &std::path::Path) -> Result<std::fs::File, SopError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SopError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SopError::ConfigError(format!("Failed to open log file {:?}: {}", path, e)))
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn parse_directive(directive: &str) -> Result<tracing_subscriber::filter::Directive, SopError> {
    directive
        .parse()
        .map_err(|e| SopError::ConfigError(format!("Invalid log directive '{}': {}", directive, e)))
}

/// Build the level filter: CLI level, then AGENT_SOP_LOG, then config.
fn build_env_filter(config: &LoggingConfig, env: EnvLookup) -> Result<EnvFilter, SopError> {
    let level = match (&config.cli.level, env(ENV_LOG)) {
        (Some(level), _) => level.clone(),
        (None, Some(directives)) => {
            return EnvFilter::try_new(&directives).map_err(|e| {
                SopError::ConfigError(format!("Invalid {} value: {}", ENV_LOG, e))
            })
        }
        (None, None) => config.level.clone(),
    };
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&level)
        .map_err(|e| SopError::ConfigError(format!("Invalid log level '{}': {}", level, e)))?;

    for (module, module_level) in &config.modules {
        filter = filter.add_directive(parse_directive(&format!("{}={}", module, module_level))?);
    }

    if let Some(modules_str) = env(ENV_LOG_MODULES) {
        for module_spec in modules_str.split(',') {
            if let Some((module, module_level)) = module_spec.split_once('=') {
                filter = filter.add_directive(parse_directive(&format!(
                    "{}={}",
                    module.trim(),
                    module_level.trim()
                ))?);
            }
        }
    }

    Ok(filter)
}

/// Output format: CLI flag, then AGENT_SOP_LOG_FORMAT, then config.
fn determine_format(config: &LoggingConfig, env: EnvLookup) -> Result<String, SopError> {
    let format = match (&config.cli.format, env(ENV_LOG_FORMAT)) {
        (Some(format), _) => format.clone(),
        (None, Some(format)) => format,
        (None, None) => config.format.clone(),
    };
    if format != "json" && format != "text" {
        return Err(SopError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }

    Ok(format)
}

/// Output destinations
#[derive(Debug, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

/// Output destinations: CLI flag, then AGENT_SOP_LOG_OUTPUT, then config.
fn determine_output(
    config: &LoggingConfig,
    env: EnvLookup,
) -> Result<OutputDestinations, SopError> {
    match (&config.cli.output, env(ENV_LOG_OUTPUT)) {
        (Some(output), _) => parse_output_destinations(output),
        (None, Some(output)) => parse_output_destinations(&output),
        (None, None) => parse_output_destinations(&config.output),
    }
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, SopError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(SopError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}
