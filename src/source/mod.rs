//! Sources of candidate SOPs: specifications, input parsing, and providers.

pub mod builtin;
pub mod error;
pub mod local;
pub mod object_store;
pub mod parse;
pub mod provider;
pub mod spec;

pub use builtin::{BuiltInCatalog, BuiltInDocument, BuiltInSource};
pub use error::{FetchError, SourceError};
pub use local::LocalSource;
pub use object_store::{ObjectStoreConnector, ObjectStoreSource, RetryPolicy, S3Connector};
pub use parse::{build_source_order, expand_source_paths, parse_source_token};
pub use provider::{CandidateDocument, FetchHandle, ListedEntry, Listing, SkippedEntry, SourceProvider};
pub use spec::{ObjectStoreLocation, SourceSpec};
