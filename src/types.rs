//! Shared naming rules for SOP documents.

/// File suffix that marks an entry as an SOP document.
pub const SOP_SUFFIX: &str = ".sop.md";

/// Derive the document name from a file name (`custom-workflow.sop.md` -> `custom-workflow`).
///
/// Returns `None` when the suffix is missing or the stem is empty, `.` or `..`.
pub fn document_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SOP_SUFFIX)
        .filter(|stem| !matches!(*stem, "" | "." | ".."))
}

/// Whether a file name or object key carries the SOP suffix.
pub fn has_sop_suffix(file_name: &str) -> bool {
    file_name.ends_with(SOP_SUFFIX)
}
