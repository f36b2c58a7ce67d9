//! Local directory provider.

use super::error::{FetchError, SourceError};
use super::provider::{FetchHandle, ListedEntry, Listing, SkippedEntry};
use crate::types::{document_name, has_sop_suffix};
use chrono::Utc;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scans one directory (non-recursive) for `*.sop.md` files.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List matching files sorted by file name. The directory walk runs on
    /// the blocking pool.
    pub async fn list(&self) -> Result<Listing, SourceError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan(&root))
            .await
            .map_err(|e| {
                SourceError::Unavailable(format!(
                    "Directory scan of {} did not complete: {}",
                    self.root.display(),
                    e
                ))
            })?
    }

    pub async fn fetch(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| FetchError::new(path.display().to_string(), e))
    }
}

fn scan(root: &Path) -> Result<Listing, SourceError> {
    if !root.exists() {
        return Err(SourceError::Unavailable(format!(
            "SOP directory does not exist: {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(SourceError::Unavailable(format!(
            "SOP path is not a directory: {}",
            root.display()
        )));
    }
    // Surface an unreadable root as a source failure rather than a per-entry note.
    std::fs::read_dir(root).map_err(|e| {
        SourceError::Unavailable(format!(
            "Failed to read SOP directory {}: {}",
            root.display(),
            e
        ))
    })?;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut listing = Listing::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                listing.skipped.push(SkippedEntry {
                    location,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = entry.file_name().to_str() else {
            if entry.file_name().to_string_lossy().ends_with(crate::types::SOP_SUFFIX) {
                listing.skipped.push(SkippedEntry {
                    location: path.display().to_string(),
                    reason: "file name is not valid UTF-8".to_string(),
                });
            }
            continue;
        };

        if !has_sop_suffix(file_name) {
            continue;
        }

        let Some(name) = document_name(file_name) else {
            listing.skipped.push(SkippedEntry {
                location: path.display().to_string(),
                reason: "file name has no document name before the suffix".to_string(),
            });
            continue;
        };

        listing.entries.push(ListedEntry {
            name: name.to_string(),
            file_name: file_name.to_string(),
            location: path.display().to_string(),
            handle: FetchHandle::Local(path.to_path_buf()),
            discovered_at: Utc::now(),
        });
    }

    Ok(listing)
}
