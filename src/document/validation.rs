//! Document validation: decides whether a fetched candidate becomes a registry entry.

use super::overview::extract_overview;
use crate::types::document_name;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller policy applied on top of the fixed suffix and encoding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Accept documents that are empty or whitespace only.
    #[serde(default = "default_true")]
    pub allow_empty: bool,

    /// Reject documents without a non-empty `## Overview` section.
    #[serde(default)]
    pub require_overview: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allow_empty: true,
            require_overview: false,
        }
    }
}

/// Why a candidate was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("not a document: '{0}' does not end with .sop.md")]
    NotADocument(String),

    #[error("malformed content: invalid UTF-8 at byte {valid_up_to}")]
    MalformedContent { valid_up_to: usize },

    #[error("empty content")]
    EmptyContent,

    #[error("no Overview section found")]
    MissingOverview,
}

/// A candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument {
    pub name: String,
    pub content: String,
    pub description: Option<String>,
}

/// Applies the acceptance rules to raw candidate bytes.
#[derive(Debug, Clone, Default)]
pub struct DocumentValidator {
    policy: ValidationPolicy,
}

impl DocumentValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Validate a candidate by file name (or object key leaf) and raw bytes.
    pub fn validate(&self, file_name: &str, raw: &[u8]) -> Result<ValidatedDocument, Rejection> {
        let name = document_name(file_name)
            .ok_or_else(|| Rejection::NotADocument(file_name.to_string()))?;

        let content = std::str::from_utf8(raw).map_err(|e| Rejection::MalformedContent {
            valid_up_to: e.valid_up_to(),
        })?;

        if content.trim().is_empty() && !self.policy.allow_empty {
            return Err(Rejection::EmptyContent);
        }

        let description = extract_overview(content);
        if description.is_none() && self.policy.require_overview {
            return Err(Rejection::MissingOverview);
        }

        Ok(ValidatedDocument {
            name: name.to_string(),
            content: content.to_string(),
            description,
        })
    }
}
