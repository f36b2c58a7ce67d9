//! Turns an ordered list of sources into a registry.
//!
//! Sources are visited strictly in the order given; the first source to
//! offer a name owns it. Failures never abort a run. They are recorded as
//! diagnostics next to whatever registry could be assembled.

mod diagnostics;
mod engine;
mod registry;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use engine::{Resolution, Resolver};
pub use registry::{Registry, ResolvedDocument};
