//! Source specifications: one ranked origin of candidate SOPs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Location and connection settings for an object storage source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectStoreLocation {
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl ObjectStoreLocation {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: None,
            region: None,
            endpoint_url: None,
            profile: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Prefix used for listing; an empty prefix lists the whole bucket.
    pub fn listing_prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }
}

/// One ranked input. Position in the caller's sequence is its precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    BuiltIn,
    Local { path: PathBuf },
    ObjectStore(ObjectStoreLocation),
}

impl SourceSpec {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        SourceSpec::Local { path: path.into() }
    }

    pub fn object_store(location: ObjectStoreLocation) -> Self {
        SourceSpec::ObjectStore(location)
    }

    /// Short kind label used in tables and logs.
    pub fn kind_label(&self) -> &'static str {
        match self {
            SourceSpec::BuiltIn => "builtin",
            SourceSpec::Local { .. } => "local",
            SourceSpec::ObjectStore(_) => "s3",
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::BuiltIn => write!(f, "builtin"),
            SourceSpec::Local { path } => write!(f, "local:{}", path.display()),
            SourceSpec::ObjectStore(location) => write!(
                f,
                "s3://{}/{}",
                location.bucket,
                location.prefix.as_deref().unwrap_or_default()
            ),
        }
    }
}
