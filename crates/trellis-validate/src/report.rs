//! Error aggregation and reporting.
//!
//! Validation produces an unordered set of `(field, message)` pairs; the
//! externally visible rendering is `'<field>' <message>` units joined with
//! `", "`, sorted lexicographically by field name (ties broken by message)
//! so the output is totally ordered and byte-identical across runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Public (wire) name of the field, e.g. `"shortName"`.
    pub field: String,
    /// Fixed human-readable message; no entity-specific interpolation
    /// beyond the field name.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

/// Collection of field errors for one request.
///
/// Internal order is unspecified; rendering always goes through
/// [`split`] / [`sort`] / [`join`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn add(&mut self, err: FieldError) {
        self.0.push(err);
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Merge another collection into this one.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Atomic `(field, message)` units in insertion order.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Units in reporting order: sorted by field name, ties by message.
    pub fn sorted(&self) -> Vec<FieldError> {
        sort(split(self))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join(&self.sorted()))
    }
}

impl std::error::Error for ValidationErrors {}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decompose a collection into atomic `(field, message)` units.
pub fn split(errs: &ValidationErrors) -> Vec<FieldError> {
    errs.0.clone()
}

/// Total order: lexicographic by field name, ties broken by message text.
pub fn sort(mut units: Vec<FieldError>) -> Vec<FieldError> {
    units.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    units
}

/// Render ordered units as the externally visible delimited string.
pub fn join(units: &[FieldError]) -> String {
    units
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_renders_quoted_field_then_message() {
        let e = FieldError::new(
            "latitude",
            "Must be a floating point number within the range +-90",
        );
        assert_eq!(
            e.to_string(),
            "'latitude' Must be a floating point number within the range +-90"
        );
    }

    #[test]
    fn sort_is_total_and_join_is_deterministic() {
        let mut errs = ValidationErrors::new();
        errs.push("shortName", "invalid characters found - Use alphanumeric . or - or _ .");
        errs.push("latitude", "Must be a floating point number within the range +-90");
        errs.push("name", "invalid characters found - Use alphanumeric . or - or _ .");
        errs.push("longitude", "Must be a floating point number within the range +-180");

        let first = errs.to_string();
        let second = errs.to_string();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "'latitude' Must be a floating point number within the range +-90, \
             'longitude' Must be a floating point number within the range +-180, \
             'name' invalid characters found - Use alphanumeric . or - or _ ., \
             'shortName' invalid characters found - Use alphanumeric . or - or _ ."
        );
    }

    #[test]
    fn same_field_ties_break_by_message() {
        let units = sort(vec![
            FieldError::new("name", "b message"),
            FieldError::new("name", "a message"),
        ]);
        assert_eq!(units[0].message, "a message");
        assert_eq!(units[1].message, "b message");
    }

    #[test]
    fn units_collect_and_keep_insertion_order_until_reporting() {
        let units = vec![
            FieldError::new("typeId", "cannot be blank"),
            FieldError::new("name", "cannot be blank"),
        ];
        let mut errs: ValidationErrors = units.into_iter().collect();
        errs.add(FieldError::new("shortName", "cannot be blank"));

        let fields: Vec<_> = errs.as_slice().iter().map(|u| u.field.as_str()).collect();
        assert_eq!(fields, vec!["typeId", "name", "shortName"]);
        // Reporting order is imposed only at rendering time.
        assert_eq!(errs.sorted()[0].field, "name");
    }

    #[test]
    fn extend_merges_collections() {
        let mut a = ValidationErrors::new();
        a.push("name", "cannot be blank");
        let mut b = ValidationErrors::new();
        b.push("typeId", "cannot be blank");
        a.extend(b);
        assert_eq!(a.len(), 2);
    }
}
