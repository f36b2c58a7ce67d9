use agent_sop::credentials::{ChainCredentialResolver, CredentialError, CredentialResolver};
use agent_sop::source::{ObjectStoreLocation, S3Connector, SourceSpec};
use agent_sop::{DiagnosticKind, Resolver};
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SHARED_CREDENTIALS: &str = "[default]\n\
aws_access_key_id = AKIDDEFAULT\n\
aws_secret_access_key = default-secret\n\
\n\
[sops]\n\
aws_access_key_id = AKIDSOPS\n\
aws_secret_access_key = sops-secret\n\
aws_session_token = sops-session\n";

fn profile_files(dir: &Path) -> ProfileFiles {
    let credentials = dir.join("credentials");
    let config = dir.join("config");
    std::fs::write(&credentials, SHARED_CREDENTIALS).unwrap();
    std::fs::write(&config, "[default]\nregion = us-east-1\n").unwrap();
    ProfileFiles::builder()
        .with_file(ProfileFileKind::Credentials, credentials)
        .with_file(ProfileFileKind::Config, config)
        .build()
}

#[tokio::test]
async fn named_profile_reads_shared_credentials_file() {
    let temp = TempDir::new().unwrap();
    let resolver = ChainCredentialResolver::new().with_profile_files(profile_files(temp.path()));

    let credentials = resolver.resolve(Some("sops")).await.unwrap();
    assert_eq!(credentials.access_key_id(), "AKIDSOPS");
    assert_eq!(credentials.secret_access_key(), "sops-secret");
    assert_eq!(credentials.session_token(), Some("sops-session"));
}

#[tokio::test]
async fn explicit_profile_missing_from_shared_files_is_no_credentials() {
    let temp = TempDir::new().unwrap();
    let resolver = ChainCredentialResolver::new().with_profile_files(profile_files(temp.path()));

    let result = resolver.resolve(Some("prod-readonly")).await;
    assert!(
        matches!(&result, Err(CredentialError::NoCredentials(msg)) if msg.contains("prod-readonly")),
        "{:?}",
        result
    );
}

#[tokio::test]
async fn missing_profile_surfaces_as_no_credentials_diagnostic() {
    let temp = TempDir::new().unwrap();
    let resolver = ChainCredentialResolver::new().with_profile_files(profile_files(temp.path()));
    let mut location = ObjectStoreLocation::new("team-sops");
    location.profile = Some("prod-readonly".to_string());
    location.region = Some("us-west-2".to_string());

    let resolution = Resolver::new()
        .with_connector(Arc::new(S3Connector::new(Arc::new(resolver))))
        .resolve(&[SourceSpec::object_store(location)])
        .await;

    assert!(resolution.registry.is_empty());
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::NoCredentials);
}
