use crate::source::SourceSpec;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    SourceUnavailable,
    NoCredentials,
    FetchFailed,
    ValidationRejected,
    DuplicateName,
    EntrySkipped,
}

impl DiagnosticKind {
    /// Whole-source failures are errors; everything else affects one candidate.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::SourceUnavailable | DiagnosticKind::NoCredentials => Severity::Error,
            DiagnosticKind::FetchFailed
            | DiagnosticKind::ValidationRejected
            | DiagnosticKind::DuplicateName
            | DiagnosticKind::EntrySkipped => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::SourceUnavailable => "source_unavailable",
            DiagnosticKind::NoCredentials => "no_credentials",
            DiagnosticKind::FetchFailed => "fetch_failed",
            DiagnosticKind::ValidationRejected => "validation_rejected",
            DiagnosticKind::DuplicateName => "duplicate_name",
            DiagnosticKind::EntrySkipped => "entry_skipped",
        }
    }
}

/// One non-fatal problem observed during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub source: SourceSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: &SourceSpec, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            source: source.clone(),
            name: None,
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }

    pub fn for_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.severity, self.source, self.kind.as_str())?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        write!(f, ": {}", self.message)
    }
}
