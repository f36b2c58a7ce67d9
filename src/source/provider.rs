//! Provider dispatch over the fixed set of backends.

use super::builtin::BuiltInSource;
use super::error::{FetchError, SourceError};
use super::local::LocalSource;
use super::object_store::ObjectStoreSource;
use super::spec::SourceSpec;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Opaque handle a provider hands out during listing and accepts back in `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchHandle {
    BuiltIn(usize),
    Local(PathBuf),
    ObjectKey(String),
}

/// One candidate name offered by a provider. Listing never carries content.
#[derive(Debug, Clone)]
pub struct ListedEntry {
    /// Document name derived from the file name.
    pub name: String,
    /// File name (or object key leaf) including the suffix.
    pub file_name: String,
    /// Human-readable origin: file path, object key, or built-in file.
    pub location: String,
    pub handle: FetchHandle,
    pub discovered_at: DateTime<Utc>,
}

/// Entry that was seen during listing but could not be offered as a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub location: String,
    pub reason: String,
}

/// Result of enumerating one source, in the provider's deterministic order.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<ListedEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl Listing {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// A fetched candidate waiting for validation.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub name: String,
    pub file_name: String,
    pub location: String,
    pub raw_bytes: Vec<u8>,
    pub source: SourceSpec,
    pub discovered_at: DateTime<Utc>,
}

impl CandidateDocument {
    pub fn new(entry: ListedEntry, raw_bytes: Vec<u8>, source: &SourceSpec) -> Self {
        Self {
            name: entry.name,
            file_name: entry.file_name,
            location: entry.location,
            raw_bytes,
            source: source.clone(),
            discovered_at: entry.discovered_at,
        }
    }
}

/// Source provider, one per `SourceSpec`.
pub enum SourceProvider {
    BuiltIn(BuiltInSource),
    Local(LocalSource),
    ObjectStore(ObjectStoreSource),
}

impl SourceProvider {
    /// Enumerate candidate names without fetching content.
    pub async fn list(&self) -> Result<Listing, SourceError> {
        match self {
            SourceProvider::BuiltIn(source) => Ok(source.list()),
            SourceProvider::Local(source) => source.list().await,
            SourceProvider::ObjectStore(source) => source.list().await,
        }
    }

    /// Fetch the raw bytes behind a handle returned by `list`.
    pub async fn fetch(&self, handle: &FetchHandle) -> Result<Vec<u8>, FetchError> {
        match (self, handle) {
            (SourceProvider::BuiltIn(source), FetchHandle::BuiltIn(index)) => source.fetch(*index),
            (SourceProvider::Local(source), FetchHandle::Local(path)) => source.fetch(path).await,
            (SourceProvider::ObjectStore(source), FetchHandle::ObjectKey(key)) => {
                source.fetch(key).await
            }
            (_, other) => Err(FetchError::new(
                format!("{:?}", other),
                "handle does not belong to this source",
            )),
        }
    }

    /// How many fetches the engine may keep in flight for this provider.
    pub fn fetch_concurrency(&self) -> usize {
        match self {
            SourceProvider::ObjectStore(source) => source.fetch_concurrency(),
            SourceProvider::BuiltIn(_) | SourceProvider::Local(_) => 1,
        }
    }
}
