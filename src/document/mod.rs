//! SOP document acceptance rules.

mod overview;
mod validation;

pub use overview::extract_overview;
pub use validation::{DocumentValidator, Rejection, ValidatedDocument, ValidationPolicy};
