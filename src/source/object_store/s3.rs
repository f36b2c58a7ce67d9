//! S3 client and connector backed by `aws-sdk-s3`.

use super::client::{ObjectListing, ObjectStoreClient, ObjectStoreConnector, ObjectStoreError};
use crate::credentials::{ChainCredentialResolver, CredentialError, CredentialResolver, Credentials};
use crate::source::error::SourceError;
use crate::source::spec::ObjectStoreLocation;
use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Region for a location: explicit, then `AWS_REGION`, then `AWS_DEFAULT_REGION`, then `us-east-1`.
pub fn resolve_region(
    location: &ObjectStoreLocation,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    location
        .region
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| lookup("AWS_REGION").filter(|r| !r.is_empty()))
        .or_else(|| lookup("AWS_DEFAULT_REGION").filter(|r| !r.is_empty()))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Parse an `endpoint-url` value. Empty means the regular AWS endpoint.
fn parse_endpoint(location: &ObjectStoreLocation) -> Result<Option<Url>, SourceError> {
    location
        .endpoint_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| {
            Url::parse(u).map_err(|e| {
                SourceError::Unavailable(format!("invalid endpoint URL '{}': {}", u, e))
            })
        })
        .transpose()
}

fn from_status(status: u16, message: String, subject: &str) -> ObjectStoreError {
    match status {
        401 | 403 => ObjectStoreError::AccessDenied { status, message },
        404 => ObjectStoreError::NotFound(format!("{} ({})", subject, message)),
        status => ObjectStoreError::Service { status, message },
    }
}

/// Map an SDK failure onto the retry classification.
fn classify<E>(err: SdkError<E, HttpResponse>, subject: &str) -> ObjectStoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            ObjectStoreError::Transport(detail)
        }
        SdkError::ServiceError(context) => {
            let service = context.err();
            let message = match (service.code(), service.message()) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (Some(code), None) => code.to_string(),
                _ => detail,
            };
            from_status(context.raw().status().as_u16(), message, subject)
        }
        SdkError::ResponseError(context) => {
            from_status(context.raw().status().as_u16(), detail, subject)
        }
        _ => ObjectStoreError::InvalidResponse(detail),
    }
}

/// One SDK client per location. SDK retries are off; `RetryPolicy` owns retrying.
pub struct S3Client {
    client: aws_sdk_s3::Client,
}

impl S3Client {
    /// A custom endpoint switches to path-style addressing.
    pub fn new(credentials: Credentials, region: impl Into<String>, endpoint: Option<Url>) -> Self {
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = endpoint {
            builder = builder
                .endpoint_url(endpoint.as_str().trim_end_matches('/'))
                .force_path_style(true);
        }
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStoreClient for S3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ObjectListing, ObjectStoreError> {
        let mut request = self.client.list_objects_v2().bucket(bucket);
        if let Some(prefix) = prefix {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }
        let output = request.send().await.map_err(|e| classify(e, bucket))?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        let truncated = output.is_truncated().unwrap_or(false);
        let next_continuation = output
            .next_continuation_token()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if truncated && next_continuation.is_none() {
            return Err(ObjectStoreError::InvalidResponse(
                "truncated listing without a continuation token".to_string(),
            ));
        }

        Ok(ObjectListing {
            keys,
            next_continuation: if truncated { next_continuation } else { None },
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, key))?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::Transport(format!("reading {}: {}", key, e)))?;
        Ok(body.into_bytes().to_vec())
    }
}

/// Connector that resolves credentials and builds an `S3Client` per location.
pub struct S3Connector {
    credentials: Arc<dyn CredentialResolver>,
}

impl S3Connector {
    pub fn new(credentials: Arc<dyn CredentialResolver>) -> Self {
        Self { credentials }
    }
}

impl Default for S3Connector {
    fn default() -> Self {
        Self::new(Arc::new(ChainCredentialResolver::new()))
    }
}

#[async_trait]
impl ObjectStoreConnector for S3Connector {
    async fn connect(
        &self,
        location: &ObjectStoreLocation,
    ) -> Result<Arc<dyn ObjectStoreClient>, SourceError> {
        let endpoint = parse_endpoint(location)?;
        let credentials = self
            .credentials
            .resolve(location.profile.as_deref())
            .await
            .map_err(|e| match e {
                CredentialError::NoCredentials(msg) => SourceError::NoCredentials(msg),
                CredentialError::Invalid(msg) => SourceError::Unavailable(msg),
            })?;

        let region = resolve_region(location, |name| std::env::var(name).ok());
        debug!(bucket = %location.bucket, region = %region, "Connected object store client");
        Ok(Arc::new(S3Client::new(credentials, region, endpoint)))
    }
}
