//! Default credential chain backed by `aws-config`.

use super::{CredentialError, CredentialResolver, Credentials};
use async_trait::async_trait;
use aws_config::profile::profile_file::ProfileFiles;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Without a profile: the SDK default chain (environment, shared files for
/// `AWS_PROFILE` or `default`, web identity, container, instance metadata).
/// With a profile: that profile from the shared files, nothing else.
/// Results are cached per profile.
#[derive(Default)]
pub struct ChainCredentialResolver {
    profile_files: Option<ProfileFiles>,
    cache: Mutex<HashMap<Option<String>, Credentials>>,
}

impl ChainCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read profiles from these files instead of `~/.aws/config` and
    /// `~/.aws/credentials`.
    pub fn with_profile_files(mut self, files: ProfileFiles) -> Self {
        self.profile_files = Some(files);
        self
    }

    async fn named_profile(&self, profile: &str) -> Result<Credentials, CredentialError> {
        let mut builder = ProfileFileCredentialsProvider::builder().profile_name(profile);
        if let Some(files) = &self.profile_files {
            builder = builder.profile_files(files.clone());
        }
        let provider = builder.build();
        let credentials = provider.provide_credentials().await.map_err(|e| {
            CredentialError::NoCredentials(format!(
                "profile '{}': {}",
                profile,
                DisplayErrorContext(&e)
            ))
        })?;
        debug!(profile, "Using shared profile credentials");
        Ok(credentials)
    }

    async fn default_chain(&self) -> Result<Credentials, CredentialError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(files) = &self.profile_files {
            loader = loader.profile_files(files.clone());
        }
        let config = loader.load().await;
        let provider = config.credentials_provider().ok_or_else(|| {
            CredentialError::NoCredentials("no credentials provider configured".to_string())
        })?;
        let credentials = provider.provide_credentials().await.map_err(classify)?;
        debug!("Using default chain credentials");
        Ok(credentials)
    }
}

fn classify(err: CredentialsError) -> CredentialError {
    let detail = DisplayErrorContext(&err).to_string();
    match err {
        CredentialsError::CredentialsNotLoaded(_) => CredentialError::NoCredentials(detail),
        _ => CredentialError::Invalid(detail),
    }
}

#[async_trait]
impl CredentialResolver for ChainCredentialResolver {
    async fn resolve(&self, profile: Option<&str>) -> Result<Credentials, CredentialError> {
        let key = profile.map(str::to_string);
        let cached = self.cache.lock().get(&key).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }
        let credentials = match profile {
            Some(name) => self.named_profile(name).await?,
            None => self.default_chain().await?,
        };
        self.cache.lock().insert(key, credentials.clone());
        Ok(credentials)
    }
}
