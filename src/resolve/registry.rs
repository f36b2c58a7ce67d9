//! The resolved name → document map.

use crate::source::SourceSpec;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A document accepted into the registry, with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDocument {
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provenance: SourceSpec,
    /// File path, object URI, or built-in file the content was read from.
    pub location: String,
    pub accepted_at: DateTime<Utc>,
}

/// Immutable result of one resolution. Names are unique; iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    documents: Vec<ResolvedDocument>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<&ResolvedDocument> {
        self.index.get(name).map(|&i| &self.documents[i])
    }

    pub fn names(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn all(&self) -> &[ResolvedDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Name → content, for comparing registries.
    pub fn contents(&self) -> BTreeMap<&str, &str> {
        self.documents
            .iter()
            .map(|d| (d.name.as_str(), d.content.as_str()))
            .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.registry.index.contains_key(name)
    }

    /// Insert unless the name is taken. Returns whether the document was added.
    pub(crate) fn insert(&mut self, document: ResolvedDocument) -> bool {
        if self.contains(&document.name) {
            return false;
        }
        self.registry
            .index
            .insert(document.name.clone(), self.registry.documents.len());
        self.registry.documents.push(document);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn build(self) -> Registry {
        self.registry
    }
}
