//! Built-in SOPs compiled into the binary.

use super::error::FetchError;
use super::provider::{FetchHandle, ListedEntry, Listing, SkippedEntry};
use crate::types::document_name;
use chrono::Utc;
use std::sync::Arc;

const BUNDLED: &[(&str, &str)] = &[
    (
        "code-assist.sop.md",
        include_str!("../../sops/code-assist.sop.md"),
    ),
    (
        "code-task-generator.sop.md",
        include_str!("../../sops/code-task-generator.sop.md"),
    ),
    (
        "codebase-summary.sop.md",
        include_str!("../../sops/codebase-summary.sop.md"),
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInDocument {
    pub file_name: String,
    pub content: String,
}

/// The fixed document set served by the built-in source.
#[derive(Debug, Clone)]
pub struct BuiltInCatalog {
    documents: Arc<Vec<BuiltInDocument>>,
}

impl BuiltInCatalog {
    /// Catalog of the SOPs shipped with this crate.
    pub fn bundled() -> Self {
        Self::from_documents(
            BUNDLED
                .iter()
                .map(|(file_name, content)| BuiltInDocument {
                    file_name: file_name.to_string(),
                    content: content.to_string(),
                })
                .collect(),
        )
    }

    /// Catalog from explicit documents, ordered by file name.
    pub fn from_documents(mut documents: Vec<BuiltInDocument>) -> Self {
        documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Self {
            documents: Arc::new(documents),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for BuiltInCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Provider over a `BuiltInCatalog`.
#[derive(Debug, Clone)]
pub struct BuiltInSource {
    catalog: BuiltInCatalog,
}

impl BuiltInSource {
    pub fn new(catalog: BuiltInCatalog) -> Self {
        Self { catalog }
    }

    pub fn list(&self) -> Listing {
        let mut listing = Listing::default();
        for (index, document) in self.catalog.documents.iter().enumerate() {
            let location = format!("builtin:{}", document.file_name);
            match document_name(&document.file_name) {
                Some(name) => listing.entries.push(ListedEntry {
                    name: name.to_string(),
                    file_name: document.file_name.clone(),
                    location,
                    handle: FetchHandle::BuiltIn(index),
                    discovered_at: Utc::now(),
                }),
                None => listing.skipped.push(SkippedEntry {
                    location,
                    reason: "not an SOP file name".to_string(),
                }),
            }
        }
        listing
    }

    pub fn fetch(&self, index: usize) -> Result<Vec<u8>, FetchError> {
        self.catalog
            .documents
            .get(index)
            .map(|document| document.content.as_bytes().to_vec())
            .ok_or_else(|| FetchError::new(format!("builtin:#{}", index), "no such built-in document"))
    }
}
