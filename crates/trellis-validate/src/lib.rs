//! Field validation for Trellis configuration resources.
//!
//! Two pieces:
//! - [`rules`]: declarative per-field predicates evaluated against the
//!   entity's JSON object form. The full rule set is always evaluated so a
//!   request reports every violation at once.
//! - [`report`]: the field-scoped error collection and its deterministic
//!   split / sort / join rendering. The surrounding system snapshot-tests
//!   exact error strings, so rendering must be byte-identical across runs.

pub mod report;
pub mod rules;

pub use report::{FieldError, ValidationErrors};
pub use rules::{FieldRule, Predicate, evaluate};
