//! I/O seams for object storage: the per-bucket client and the connector that builds it.

use crate::source::error::SourceError;
use crate::source::spec::ObjectStoreLocation;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub keys: Vec<String>,
    /// Token for the next page; `None` on the last page.
    pub next_continuation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("access denied (HTTP {status}): {message}")]
    AccessDenied { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ObjectStoreError>,
    },
}

impl ObjectStoreError {
    /// Transport errors, timeouts, HTTP 5xx and HTTP 429 are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ObjectStoreError::Timeout(_) | ObjectStoreError::Transport(_) => true,
            ObjectStoreError::Service { status, .. } => *status >= 500 || *status == 429,
            ObjectStoreError::AccessDenied { .. }
            | ObjectStoreError::NotFound(_)
            | ObjectStoreError::InvalidResponse(_)
            | ObjectStoreError::RetriesExhausted { .. } => false,
        }
    }
}

#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ObjectListing, ObjectStoreError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
}

/// Builds a client for one object store location.
#[async_trait]
pub trait ObjectStoreConnector: Send + Sync {
    async fn connect(
        &self,
        location: &ObjectStoreLocation,
    ) -> Result<Arc<dyn ObjectStoreClient>, SourceError>;
}
