//! Parsing of caller source input into an ordered `SourceSpec` list.
//!
//! Two token shapes are accepted: `type=s3,bucket=B[,prefix=P][,region=R][,endpoint-url=U][,profile=Pr]`
//! and colon-separated lists of filesystem paths. Precedence is external sources first, then
//! local paths, then the built-in set.

use super::spec::{ObjectStoreLocation, SourceSpec};
use crate::error::SopError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

const KNOWN_S3_KEYS: &[&str] = &["type", "bucket", "prefix", "region", "endpoint-url", "profile"];

/// Parse one `key=value,...` source token.
pub fn parse_source_token(token: &str) -> Result<SourceSpec, SopError> {
    let mut params: HashMap<&str, &str> = HashMap::new();
    for part in token.split(',') {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            SopError::InvalidSource(format!("Invalid source parameter format: {}", part))
        })?;
        params.insert(key.trim(), value.trim());
    }

    let source_type = params
        .get("type")
        .copied()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SopError::InvalidSource("Source type is required".to_string()))?;

    match source_type {
        "s3" => {
            let bucket = params
                .get("bucket")
                .copied()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| SopError::InvalidSource("S3 bucket is required".to_string()))?;

            for key in params.keys() {
                if !KNOWN_S3_KEYS.contains(key) {
                    warn!(key = %key, token = %token, "Ignoring unknown S3 source parameter");
                }
            }

            let optional = |key: &str| {
                params
                    .get(key)
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
            };

            Ok(SourceSpec::ObjectStore(ObjectStoreLocation {
                bucket: bucket.to_string(),
                prefix: optional("prefix"),
                region: optional("region"),
                endpoint_url: optional("endpoint-url"),
                profile: optional("profile"),
            }))
        }
        other => Err(SopError::InvalidSource(format!(
            "Unsupported source type: {}",
            other
        ))),
    }
}

/// Expand a colon-separated path list into local sources, skipping empty segments.
pub fn expand_source_paths(paths: &str) -> Result<Vec<SourceSpec>, SopError> {
    paths
        .split(':')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| resolve_local_path(segment).map(SourceSpec::local))
        .collect()
}

/// Build the full precedence order from CLI/config input.
pub fn build_source_order(
    sop_sources: &[String],
    sop_paths: Option<&str>,
    include_builtin: bool,
) -> Result<Vec<SourceSpec>, SopError> {
    let mut specs = Vec::new();

    for token in sop_sources {
        specs.push(parse_source_token(token)?);
    }

    if let Some(paths) = sop_paths {
        specs.extend(expand_source_paths(paths)?);
    }

    if include_builtin {
        specs.push(SourceSpec::BuiltIn);
    }

    Ok(specs)
}

/// Expand `~` and make the path absolute, canonicalizing when it exists.
fn resolve_local_path(raw: &str) -> Result<PathBuf, SopError> {
    let expanded = if raw == "~" {
        home_dir()?
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map_err(|e| {
                SopError::InvalidSource(format!("Failed to get current directory: {}", e))
            })?
            .join(expanded)
    };

    Ok(canonicalize_if_exists(&absolute))
}

fn canonicalize_if_exists(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn home_dir() -> Result<PathBuf, SopError> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| SopError::InvalidSource("HOME not set for ~ expansion".to_string()))
}
