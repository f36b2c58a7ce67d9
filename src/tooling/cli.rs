//! CLI Tooling
//!
//! Command-line interface: resolve SOPs from the configured sources, then
//! serve them as prompts, export them as skills, or list them.

use super::format::{
    format_diagnostic_line, format_export_report, format_resolution_json, format_resolution_text,
};
use crate::config::{ConfigLoader, SopConfig};
use crate::error::SopError;
use crate::export::export_skills;
use crate::logging::LoggingConfig;
use crate::resolve::{Resolution, Resolver};
use crate::serve::serve_stdio;
use crate::source::{build_source_order, SourceSpec};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Agent SOP - serve and export standard operating procedures for agents
#[derive(Parser, Debug)]
#[command(name = "agent-sop")]
#[command(about = "Resolve agent SOPs from ranked sources and serve them as prompts or skills")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags over the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        base.clone().with_overrides(
            self.log_level.as_deref(),
            self.log_format.as_deref(),
            self.log_output.as_deref(),
            self.log_file.clone(),
        )
    }
}

/// Source selection shared by every command. Values here rank above the config file's.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceArgs {
    /// External SOP source, highest precedence first (repeatable),
    /// e.g. type=s3,bucket=my-sops,prefix=team/,region=us-west-2
    #[arg(long = "sop-source", value_name = "SOURCE")]
    pub sop_source: Vec<String>,

    /// Colon-separated directories containing *.sop.md files
    #[arg(long = "sop-paths", value_name = "PATHS")]
    pub sop_paths: Option<String>,

    /// Leave out the built-in SOPs
    #[arg(long)]
    pub no_builtin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve SOPs as MCP prompts over stdio
    Mcp {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Export SOPs as skills (<output-dir>/<name>/SKILL.md)
    Skills {
        /// Directory to write skills into
        #[arg(long, default_value = "skills")]
        output_dir: PathBuf,
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// List resolved SOPs and resolution diagnostics
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
        #[command(flatten)]
        sources: SourceArgs,
    },
}

/// CLI context: configuration plus the runtime commands execute on.
pub struct CliContext {
    config: SopConfig,
    logging: LoggingConfig,
    runtime: tokio::runtime::Runtime,
    cancel: CancellationToken,
}

impl CliContext {
    /// Load configuration and start the runtime. Ctrl-C cancels the running command.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, SopError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::with_config(config)
    }

    pub fn with_config(config: SopConfig) -> Result<Self, SopError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| SopError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        Ok(Self {
            logging: config.logging.clone(),
            config,
            runtime,
            cancel,
        })
    }

    pub fn config(&self) -> &SopConfig {
        &self.config
    }

    /// Use the effective logging settings (config plus CLI flags).
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Full precedence: CLI sources, config sources, CLI paths, config paths, then built-ins.
    pub fn source_order(&self, args: &SourceArgs) -> Result<Vec<SourceSpec>, SopError> {
        let configured = &self.config.sources;
        let sop_sources: Vec<String> = args
            .sop_source
            .iter()
            .chain(configured.sop_sources.iter())
            .cloned()
            .collect();
        let sop_paths = [args.sop_paths.as_deref(), configured.sop_paths.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(":");
        let include_builtin = configured.include_builtin && !args.no_builtin;

        build_source_order(
            &sop_sources,
            Some(sop_paths.as_str()).filter(|p| !p.is_empty()),
            include_builtin,
        )
    }

    /// Resolve the selected sources, echoing diagnostics to stderr.
    pub fn resolve(&self, args: &SourceArgs) -> Result<Resolution, SopError> {
        let specs = self.source_order(args)?;
        let resolver = Resolver::from_config(&self.config);
        let resolution = self
            .runtime
            .block_on(resolver.resolve_with_cancel(&specs, &self.cancel))?;
        for diagnostic in &resolution.diagnostics {
            eprintln!("{}", format_diagnostic_line(diagnostic));
        }
        Ok(resolution)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, SopError> {
        match command {
            Commands::Mcp { sources } => {
                if self.logging.writes_to_stdout()? {
                    return Err(SopError::ConfigError(
                        "mcp speaks its protocol on stdout; use --log-output stderr, file, or file+stderr"
                            .to_string(),
                    ));
                }
                let resolution = self.resolve(sources)?;
                info!(prompts = resolution.registry.len(), "Serving SOP prompts");
                self.runtime
                    .block_on(serve_stdio(resolution.registry, self.cancel.clone()))?;
                Ok(String::new())
            }
            Commands::Skills {
                output_dir,
                sources,
            } => {
                let resolution = self.resolve(sources)?;
                let report = export_skills(&resolution.registry, output_dir)?;
                Ok(format_export_report(&report))
            }
            Commands::List { format, sources } => {
                let resolution = self.resolve(sources)?;
                Ok(if format == "json" {
                    format_resolution_json(&resolution)
                } else {
                    format_resolution_text(&resolution)
                })
            }
        }
    }
}
