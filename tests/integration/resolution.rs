use super::support::{catalog, write_sop, FakeBucket, FakeConnector};
use agent_sop::document::ValidationPolicy;
use agent_sop::source::{ObjectStoreLocation, RetryPolicy, SourceSpec};
use agent_sop::{DiagnosticKind, Resolver, Severity, SopError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
        attempt_timeout: Duration::from_secs(5),
    }
}

fn s3(bucket: &str) -> SourceSpec {
    SourceSpec::object_store(ObjectStoreLocation::new(bucket))
}

#[tokio::test]
async fn first_source_wins_across_local_directories() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_sop(&a, "x", "A");
    write_sop(&b, "x", "B");
    write_sop(&b, "y", "Y");

    let resolution = Resolver::new()
        .resolve(&[SourceSpec::local(&a), SourceSpec::local(&b)])
        .await;

    let registry = &resolution.registry;
    assert_eq!(registry.names(), vec!["x", "y"]);
    assert_eq!(registry.get("x").unwrap().content, "A");
    assert_eq!(registry.get("x").unwrap().provenance, SourceSpec::local(&a));
    assert_eq!(registry.get("y").unwrap().content, "Y");
    assert_eq!(registry.get("y").unwrap().provenance, SourceSpec::local(&b));
    assert!(resolution.diagnostics.is_empty());
}

#[tokio::test]
async fn non_sop_files_are_never_listed() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("foo.txt"), "not an sop").unwrap();
    std::fs::write(temp.path().join("notes.md"), "# notes").unwrap();
    write_sop(temp.path(), "foo", "# Foo");

    let resolution = Resolver::new()
        .resolve(&[SourceSpec::local(temp.path())])
        .await;
    assert_eq!(resolution.registry.names(), vec!["foo"]);
}

#[tokio::test]
async fn unreachable_object_store_does_not_block_other_sources() {
    let temp = TempDir::new().unwrap();
    write_sop(temp.path(), "local-only", "# Local");

    let resolution = Resolver::new()
        .with_connector(Arc::new(FakeConnector::Unreachable))
        .with_builtin_catalog(catalog(&[("builtin-only", "# Builtin")]))
        .resolve(&[s3("down"), SourceSpec::local(temp.path()), SourceSpec::BuiltIn])
        .await;

    assert_eq!(resolution.registry.names(), vec!["local-only", "builtin-only"]);
    assert_eq!(resolution.diagnostics.len(), 1);
    let diagnostic = &resolution.diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.kind, DiagnosticKind::SourceUnavailable);
    assert_eq!(diagnostic.source, s3("down"));
}

#[tokio::test]
async fn missing_credentials_are_reported_as_their_own_kind() {
    let resolution = Resolver::new()
        .with_connector(Arc::new(FakeConnector::NoCredentials))
        .resolve(&[s3("locked")])
        .await;

    assert!(resolution.registry.is_empty());
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::NoCredentials);
    assert_eq!(resolution.diagnostics[0].severity, Severity::Error);
}

#[tokio::test]
async fn malformed_content_is_isolated() {
    let temp = TempDir::new().unwrap();
    write_sop(temp.path(), "good", "# Good");
    std::fs::write(temp.path().join("broken.sop.md"), [0x23, 0x20, 0xff, 0xfe]).unwrap();

    let resolution = Resolver::new()
        .resolve(&[SourceSpec::local(temp.path())])
        .await;

    assert_eq!(resolution.registry.names(), vec!["good"]);
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].severity, Severity::Warning);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::ValidationRejected);
    assert_eq!(resolution.diagnostics[0].name.as_deref(), Some("broken"));
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_file_is_a_fetch_failure_without_hiding_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    write_sop(temp.path(), "readable", "# Readable");
    write_sop(temp.path(), "locked", "# Locked");
    let locked = temp.path().join("locked.sop.md");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&locked).is_ok() {
        // Running with privileges that ignore file modes.
        return;
    }

    let resolution = Resolver::new()
        .resolve(&[SourceSpec::local(temp.path())])
        .await;
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(resolution.registry.names(), vec!["readable"]);
    assert_eq!(resolution.diagnostics.len(), 1);
    let diagnostic = &resolution.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::FetchFailed);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.name.as_deref(), Some("locked"));
}

#[tokio::test]
async fn every_source_failing_yields_empty_registry() {
    let temp = TempDir::new().unwrap();
    let specs = vec![
        s3("down"),
        SourceSpec::local(temp.path().join("missing-a")),
        SourceSpec::local(temp.path().join("missing-b")),
    ];

    let resolution = Resolver::new()
        .with_connector(Arc::new(FakeConnector::Unreachable))
        .resolve(&specs)
        .await;

    assert!(resolution.registry.is_empty());
    assert_eq!(resolution.errors().count(), 3);
    let sources: Vec<_> = resolution.diagnostics.iter().map(|d| d.source.clone()).collect();
    assert_eq!(sources, specs);
}

#[tokio::test]
async fn object_store_documents_take_precedence_over_builtins() {
    let bucket = Arc::new(FakeBucket::with_objects(&[
        ("team/deploy.sop.md", b"# Team deploy".as_slice()),
        ("team/readme.md", b"ignored".as_slice()),
        ("other/deploy.sop.md", b"# Outside prefix".as_slice()),
    ]));
    let location = ObjectStoreLocation::new("sops").with_prefix("team/");

    let resolution = Resolver::new()
        .with_connector(Arc::new(FakeConnector::Bucket(bucket)))
        .with_builtin_catalog(catalog(&[("deploy", "# Builtin deploy")]))
        .resolve(&[SourceSpec::object_store(location.clone()), SourceSpec::BuiltIn])
        .await;

    let deploy = resolution.registry.get("deploy").unwrap();
    assert_eq!(deploy.content, "# Team deploy");
    assert_eq!(deploy.provenance, SourceSpec::object_store(location));
    assert_eq!(deploy.location, "s3://sops/team/deploy.sop.md");
    assert!(resolution.diagnostics.is_empty());
}

#[tokio::test]
async fn transient_listing_failures_are_retried() {
    let bucket = Arc::new(FakeBucket {
        list_failures: 2,
        ..FakeBucket::with_objects(&[("a.sop.md", b"# A".as_slice())])
    });

    let resolution = Resolver::new()
        .with_retry_policy(fast_retry(3))
        .with_connector(Arc::new(FakeConnector::Bucket(bucket.clone())))
        .resolve(&[s3("flaky")])
        .await;

    assert_eq!(resolution.registry.names(), vec!["a"]);
    assert!(resolution.diagnostics.is_empty());
    assert_eq!(bucket.list_calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_listing_retries_make_the_source_unavailable() {
    let bucket = Arc::new(FakeBucket {
        list_failures: 10,
        ..FakeBucket::with_objects(&[("a.sop.md", b"# A".as_slice())])
    });

    let resolution = Resolver::new()
        .with_retry_policy(fast_retry(2))
        .with_connector(Arc::new(FakeConnector::Bucket(bucket)))
        .resolve(&[s3("flaky")])
        .await;

    assert!(resolution.registry.is_empty());
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::SourceUnavailable);
    assert!(resolution.diagnostics[0].message.contains("2 attempts"));
}

#[tokio::test]
async fn require_overview_policy_rejects_bare_documents() {
    let temp = TempDir::new().unwrap();
    write_sop(temp.path(), "described", "# D\n\n## Overview\nDoes things.\n");
    write_sop(temp.path(), "bare", "# Bare\n");

    let resolution = Resolver::new()
        .with_policy(ValidationPolicy {
            allow_empty: true,
            require_overview: true,
        })
        .resolve(&[SourceSpec::local(temp.path())])
        .await;

    assert_eq!(resolution.registry.names(), vec!["described"]);
    assert_eq!(
        resolution.registry.get("described").unwrap().description.as_deref(),
        Some("Does things.")
    );
    assert_eq!(resolution.warnings().count(), 1);
}

#[tokio::test]
async fn cancellation_during_listing_discards_everything() {
    let bucket = Arc::new(FakeBucket {
        list_delay: Some(Duration::from_secs(30)),
        ..FakeBucket::with_objects(&[("a.sop.md", b"# A".as_slice())])
    });
    let resolver = Resolver::new()
        .with_connector(Arc::new(FakeConnector::Bucket(bucket)))
        .with_builtin_catalog(catalog(&[("b", "# B")]));

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = resolver
        .resolve_with_cancel(&[SourceSpec::BuiltIn, s3("slow")], &token)
        .await;
    assert!(matches!(result, Err(SopError::Cancelled)));
}

#[tokio::test]
async fn cancellation_during_fetch_discards_everything() {
    let bucket = Arc::new(FakeBucket {
        get_delay: Some(Duration::from_secs(30)),
        ..FakeBucket::with_objects(&[("a.sop.md", b"# A".as_slice())])
    });
    let resolver = Resolver::new()
        .with_retry_policy(RetryPolicy {
            attempt_timeout: Duration::from_secs(60),
            ..fast_retry(1)
        })
        .with_connector(Arc::new(FakeConnector::Bucket(bucket.clone())))
        .with_builtin_catalog(catalog(&[("b", "# B")]));

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = resolver
        .resolve_with_cancel(&[SourceSpec::BuiltIn, s3("slow")], &token)
        .await;
    assert!(matches!(result, Err(SopError::Cancelled)));
    assert_eq!(bucket.list_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(bucket.get_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}
