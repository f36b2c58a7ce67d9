//! Credentials for object storage sources.
//!
//! Lookup is delegated to the AWS SDK provider chain. A source that names a
//! profile is served from the shared profile files only.

mod chain;

pub use aws_credential_types::Credentials;
pub use chain::ChainCredentialResolver;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("no credentials found: {0}")]
    NoCredentials(String),

    #[error("invalid credentials: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, profile: Option<&str>) -> Result<Credentials, CredentialError>;
}

/// Resolver that always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

#[async_trait]
impl CredentialResolver for StaticCredentials {
    async fn resolve(&self, _profile: Option<&str>) -> Result<Credentials, CredentialError> {
        Ok(self.0.clone())
    }
}
