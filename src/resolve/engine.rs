//! Resolution engine: walks sources in precedence order and assembles the registry.

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::registry::{Registry, RegistryBuilder, ResolvedDocument};
use crate::config::SopConfig;
use crate::document::{DocumentValidator, ValidationPolicy};
use crate::error::SopError;
use crate::source::{
    BuiltInCatalog, BuiltInSource, CandidateDocument, LocalSource, ObjectStoreConnector,
    ObjectStoreSource, RetryPolicy, S3Connector, SourceError, SourceProvider, SourceSpec,
};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Registry plus everything that went wrong while building it.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

pub struct Resolver {
    validator: DocumentValidator,
    retry: RetryPolicy,
    fetch_concurrency: usize,
    connector: Arc<dyn ObjectStoreConnector>,
    builtin: BuiltInCatalog,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            validator: DocumentValidator::default(),
            retry: RetryPolicy::default(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            connector: Arc::new(S3Connector::default()),
            builtin: BuiltInCatalog::bundled(),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with validation and object store settings taken from configuration.
    pub fn from_config(config: &SopConfig) -> Self {
        Self::default()
            .with_policy(config.validation)
            .with_retry_policy(RetryPolicy::from(&config.object_store))
            .with_fetch_concurrency(config.object_store.fetch_concurrency)
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validator = DocumentValidator::new(policy);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn ObjectStoreConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_builtin_catalog(mut self, catalog: BuiltInCatalog) -> Self {
        self.builtin = catalog;
        self
    }

    /// Resolve `specs` in order. Never fails; problems become diagnostics.
    pub async fn resolve(&self, specs: &[SourceSpec]) -> Resolution {
        let token = CancellationToken::new();
        self.resolve_with_cancel(specs, &token)
            .await
            .unwrap_or_default()
    }

    /// Like `resolve`, but aborts with `SopError::Cancelled` once `cancel` fires.
    /// A partially built registry is discarded.
    pub async fn resolve_with_cancel(
        &self,
        specs: &[SourceSpec],
        cancel: &CancellationToken,
    ) -> Result<Resolution, SopError> {
        if cancel.is_cancelled() {
            return Err(SopError::Cancelled);
        }

        let mut builder = RegistryBuilder::default();
        let mut diagnostics = Vec::new();

        for spec in specs {
            info!(source = %spec, "Resolving source");
            let before = builder.len();

            let provider = match cancellable(cancel, self.provider_for(spec)).await? {
                Ok(provider) => provider,
                Err(err) => {
                    diagnostics.push(source_failure(spec, &err));
                    continue;
                }
            };

            let listing = match cancellable(cancel, provider.list()).await? {
                Ok(listing) => listing,
                Err(err) => {
                    diagnostics.push(source_failure(spec, &err));
                    continue;
                }
            };

            for skipped in listing.skipped {
                let diagnostic = Diagnostic::new(spec, DiagnosticKind::EntrySkipped, skipped.reason)
                    .for_name(skipped.location);
                warn!(source = %spec, diagnostic = %diagnostic, "Listing entry skipped");
                diagnostics.push(diagnostic);
            }

            let mut offered = HashSet::new();
            let mut pending = Vec::new();
            for entry in listing.entries {
                if !offered.insert(entry.name.clone()) {
                    let diagnostic = Diagnostic::new(
                        spec,
                        DiagnosticKind::DuplicateName,
                        format!("{} repeats a name already listed by this source", entry.location),
                    )
                    .for_name(&entry.name);
                    warn!(source = %spec, name = %entry.name, "Duplicate name within source");
                    diagnostics.push(diagnostic);
                    continue;
                }
                if builder.contains(&entry.name) {
                    debug!(source = %spec, name = %entry.name, "Shadowed by higher-priority source");
                    continue;
                }
                pending.push(entry);
            }

            let provider_ref = &provider;
            let fetches = stream::iter(pending)
                .map(move |entry| async move {
                    let result = provider_ref.fetch(&entry.handle).await;
                    (entry, result)
                })
                .buffered(provider.fetch_concurrency())
                .collect::<Vec<_>>();

            for (entry, result) in cancellable(cancel, fetches).await? {
                match result {
                    Ok(raw_bytes) => {
                        let candidate = CandidateDocument::new(entry, raw_bytes, spec);
                        if let Some(diagnostic) = self.accept(candidate, &mut builder) {
                            diagnostics.push(diagnostic);
                        }
                    }
                    Err(err) => {
                        warn!(source = %spec, name = %entry.name, error = %err, "Fetch failed");
                        diagnostics.push(
                            Diagnostic::new(spec, DiagnosticKind::FetchFailed, err.to_string())
                                .for_name(entry.name),
                        );
                    }
                }
            }

            info!(source = %spec, accepted = builder.len() - before, "Source resolved");
        }

        let registry = builder.build();
        info!(
            documents = registry.len(),
            diagnostics = diagnostics.len(),
            "Resolution complete"
        );
        Ok(Resolution {
            registry,
            diagnostics,
        })
    }

    async fn provider_for(&self, spec: &SourceSpec) -> Result<SourceProvider, SourceError> {
        Ok(match spec {
            SourceSpec::BuiltIn => SourceProvider::BuiltIn(BuiltInSource::new(self.builtin.clone())),
            SourceSpec::Local { path } => SourceProvider::Local(LocalSource::new(path.clone())),
            SourceSpec::ObjectStore(location) => {
                let client = self.connector.connect(location).await?;
                SourceProvider::ObjectStore(ObjectStoreSource::new(
                    location.clone(),
                    client,
                    self.retry,
                    self.fetch_concurrency,
                ))
            }
        })
    }

    /// Validate and insert. Returns a diagnostic when the candidate is rejected.
    fn accept(
        &self,
        candidate: CandidateDocument,
        builder: &mut RegistryBuilder,
    ) -> Option<Diagnostic> {
        let validated = match self
            .validator
            .validate(&candidate.file_name, &candidate.raw_bytes)
        {
            Ok(validated) => validated,
            Err(rejection) => {
                warn!(
                    source = %candidate.source,
                    name = %candidate.name,
                    reason = %rejection,
                    "Document rejected"
                );
                return Some(
                    Diagnostic::new(
                        &candidate.source,
                        DiagnosticKind::ValidationRejected,
                        format!("{}: {}", candidate.location, rejection),
                    )
                    .for_name(candidate.name),
                );
            }
        };

        debug!(
            source = %candidate.source,
            name = %validated.name,
            discovered_at = %candidate.discovered_at,
            "Document accepted"
        );
        builder.insert(ResolvedDocument {
            name: validated.name,
            content: validated.content,
            description: validated.description,
            provenance: candidate.source,
            location: candidate.location,
            accepted_at: Utc::now(),
        });
        None
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = T>,
) -> Result<T, SopError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SopError::Cancelled),
        value = future => Ok(value),
    }
}

fn source_failure(spec: &SourceSpec, err: &SourceError) -> Diagnostic {
    let kind = match err {
        SourceError::NoCredentials(_) => DiagnosticKind::NoCredentials,
        SourceError::Unavailable(_) => DiagnosticKind::SourceUnavailable,
    };
    warn!(source = %spec, error = %err, "Source unavailable");
    Diagnostic::new(spec, kind, err.to_string())
}
