//! Object storage provider (S3-compatible).

mod client;
mod retry;
mod s3;

pub use client::{ObjectListing, ObjectStoreClient, ObjectStoreConnector, ObjectStoreError};
pub use retry::RetryPolicy;
pub use s3::{resolve_region, S3Client, S3Connector, DEFAULT_REGION};

use super::error::{FetchError, SourceError};
use super::provider::{FetchHandle, ListedEntry, Listing, SkippedEntry};
use super::spec::ObjectStoreLocation;
use crate::types::{document_name, has_sop_suffix};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

pub struct ObjectStoreSource {
    location: ObjectStoreLocation,
    client: Arc<dyn ObjectStoreClient>,
    retry: RetryPolicy,
    fetch_concurrency: usize,
}

impl ObjectStoreSource {
    pub fn new(
        location: ObjectStoreLocation,
        client: Arc<dyn ObjectStoreClient>,
        retry: RetryPolicy,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            location,
            client,
            retry,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    fn object_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.location.bucket, key)
    }

    async fn all_keys(&self) -> Result<Vec<String>, ObjectStoreError> {
        let bucket = self.location.bucket.as_str();
        let prefix = self.location.listing_prefix();
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let token = continuation.as_deref();
            let page = self
                .retry
                .run("list_objects", || self.client.list_objects(bucket, prefix, token))
                .await?;
            pages += 1;
            keys.extend(page.keys);

            match page.next_continuation {
                Some(next) if continuation.as_deref() == Some(next.as_str()) => {
                    return Err(ObjectStoreError::InvalidResponse(format!(
                        "continuation token repeated: {}",
                        next
                    )));
                }
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        debug!(bucket, pages, keys = keys.len(), "Listed object store keys");
        Ok(keys)
    }

    /// List `*.sop.md` keys under the prefix, sorted by key.
    pub async fn list(&self) -> Result<Listing, SourceError> {
        let mut keys = self.all_keys().await.map_err(|e| {
            SourceError::Unavailable(format!(
                "s3://{}/{}: {}",
                self.location.bucket,
                self.location.prefix.as_deref().unwrap_or_default(),
                e
            ))
        })?;
        keys.sort();

        let mut listing = Listing::default();
        for key in keys {
            let leaf = key.rsplit('/').next().unwrap_or(key.as_str());
            if !has_sop_suffix(leaf) {
                continue;
            }
            let Some(name) = document_name(leaf) else {
                listing.skipped.push(SkippedEntry {
                    location: self.object_uri(&key),
                    reason: "object key has no document name before the suffix".to_string(),
                });
                continue;
            };
            listing.entries.push(ListedEntry {
                name: name.to_string(),
                file_name: leaf.to_string(),
                location: self.object_uri(&key),
                handle: FetchHandle::ObjectKey(key.clone()),
                discovered_at: Utc::now(),
            });
        }
        Ok(listing)
    }

    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        let bucket = self.location.bucket.as_str();
        self.retry
            .run("get_object", || self.client.get_object(bucket, key))
            .await
            .map_err(|e| FetchError::new(self.object_uri(key), e))
    }
}
