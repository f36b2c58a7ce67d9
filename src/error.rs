//! Crate-level error type for caller-facing failures.
//!
//! Per-source and per-document failures never surface here; they are
//! recorded as diagnostics by the resolver. `SopError` covers what the
//! caller must handle: bad configuration, malformed source input, a
//! cancelled run, and adapter I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid SOP source: {0}")]
    InvalidSource(String),

    #[error("Resolution cancelled")]
    Cancelled,

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Prompt server error: {0}")]
    ServeError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for SopError {
    fn from(err: config::ConfigError) -> Self {
        SopError::ConfigError(err.to_string())
    }
}
