//! Agent SOP: ranked resolution of standard operating procedures for agents
//!
//! SOPs are markdown documents named `<name>.sop.md`. They are gathered from
//! an ordered list of sources (object storage buckets, local directories,
//! and a built-in set), merged first-wins into a `Registry`, and then served
//! as MCP prompts or exported as skills.

pub mod config;
pub mod credentials;
pub mod document;
pub mod error;
pub mod export;
pub mod logging;
pub mod resolve;
pub mod serve;
pub mod source;
pub mod tooling;
pub mod types;

pub use error::SopError;
pub use resolve::{Diagnostic, DiagnosticKind, Registry, Resolution, ResolvedDocument, Resolver, Severity};
pub use source::SourceSpec;
