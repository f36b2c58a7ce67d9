use thiserror::Error;

/// Whole-source failure. Recorded as an error diagnostic; resolution moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("no credentials available: {0}")]
    NoCredentials(String),
}

/// Single-candidate failure. Recorded as a warning; siblings are still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch {location}: {reason}")]
pub struct FetchError {
    pub location: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(location: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}
