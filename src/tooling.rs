//! Tooling & Integration Layer
//!
//! The `agent-sop` command line: source selection flags, command dispatch,
//! and output formatting.

pub mod cli;
mod format;

pub use cli::{Cli, CliContext, Commands, SourceArgs};
pub use format::{format_resolution_json, format_resolution_text};
