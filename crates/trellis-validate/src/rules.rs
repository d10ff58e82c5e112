//! Declarative per-field validation rules.
//!
//! A rule pairs a field's public name with a predicate. Evaluation walks the
//! entity's JSON object form; it is pure, order-independent, and never
//! short-circuits, so an entity violating N independent rules reports
//! exactly N errors. Absent (or null) optional fields are skipped by every
//! predicate except `Required`.
//!
//! Cross-record checks (referential existence against the open transaction)
//! are asynchronous and live with the resource implementations; their
//! failures merge into the same [`ValidationErrors`] collection.

use crate::report::ValidationErrors;
use serde_json::Value;

/// A pure predicate over a single field value.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// The field must be present and non-null.
    Required,
    /// The field must be a float within `min..=max` inclusive.
    FloatRange { min: f64, max: f64 },
    /// The field must be a string matching `pattern`; `message` is the
    /// fixed failure text.
    Pattern {
        pattern: &'static str,
        message: &'static str,
    },
}

/// Association of a field accessor with one predicate.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub predicate: Predicate,
}

impl FieldRule {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            predicate: Predicate::Required,
        }
    }

    pub fn float_range(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            predicate: Predicate::FloatRange { min, max },
        }
    }

    pub fn pattern(field: &'static str, pattern: &'static str, message: &'static str) -> Self {
        Self {
            field,
            predicate: Predicate::Pattern { pattern, message },
        }
    }
}

/// Evaluate the full rule set against an entity's JSON object form.
///
/// Always evaluates every rule; the caller sorts the result at reporting
/// time, not here.
pub fn evaluate(rules: &[FieldRule], entity: &Value) -> ValidationErrors {
    let mut errs = ValidationErrors::new();
    for rule in rules {
        let value = entity.get(rule.field).filter(|v| !v.is_null());
        match &rule.predicate {
            Predicate::Required => {
                if value.is_none() {
                    errs.push(rule.field, "cannot be blank");
                }
            }
            Predicate::FloatRange { min, max } => {
                let Some(v) = value else { continue };
                let in_range = v.as_f64().map(|f| f >= *min && f <= *max);
                if in_range != Some(true) {
                    errs.push(rule.field, range_message(*min, *max));
                }
            }
            Predicate::Pattern { pattern, message } => {
                let Some(v) = value else { continue };
                match v.as_str() {
                    Some(s) => match regex::Regex::new(pattern) {
                        Ok(re) => {
                            if !re.is_match(s) {
                                errs.push(rule.field, *message);
                            }
                        }
                        Err(_) => {
                            tracing::warn!("invalid rule pattern for field {}: {}", rule.field, pattern);
                            errs.push(rule.field, *message);
                        }
                    },
                    None => errs.push(rule.field, *message),
                }
            }
        }
    }
    errs
}

fn range_message(min: f64, max: f64) -> String {
    if min == -max {
        format!("Must be a floating point number within the range +-{}", max)
    } else {
        format!(
            "Must be a floating point number within the range {} to {}",
            min, max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CHARSET_MSG: &str = "invalid characters found - Use alphanumeric . or - or _ .";
    const NAME_PATTERN: &str = r"^[A-Za-z0-9._-]+$";

    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::required("name"),
            FieldRule::pattern("name", NAME_PATTERN, CHARSET_MSG),
            FieldRule::float_range("latitude", -90.0, 90.0),
            FieldRule::float_range("longitude", -180.0, 180.0),
        ]
    }

    #[test]
    fn all_violations_reported_not_just_first() {
        let entity = json!({
            "name": "not!valid",
            "latitude": -190.0,
            "longitude": 200.0
        });
        let errs = evaluate(&rules(), &entity);
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn absent_optional_fields_are_skipped() {
        // latitude/longitude absent and not required: no errors for them.
        let errs = evaluate(&rules(), &json!({ "name": "edge-east" }));
        assert!(errs.is_empty(), "got: {}", errs);
    }

    #[test]
    fn required_fires_on_absent_and_null() {
        let errs = evaluate(&rules(), &json!({}));
        assert_eq!(errs.sorted()[0].to_string(), "'name' cannot be blank");

        let errs = evaluate(&rules(), &json!({ "name": null }));
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn range_is_inclusive_and_symmetric_message() {
        let errs = evaluate(&rules(), &json!({ "name": "a", "latitude": 90.0 }));
        assert!(errs.is_empty());

        let errs = evaluate(&rules(), &json!({ "name": "a", "latitude": 90.1 }));
        assert_eq!(
            errs.sorted()[0].to_string(),
            "'latitude' Must be a floating point number within the range +-90"
        );

        let errs = evaluate(&rules(), &json!({ "name": "a", "longitude": -180.5 }));
        assert_eq!(
            errs.sorted()[0].to_string(),
            "'longitude' Must be a floating point number within the range +-180"
        );
    }

    #[test]
    fn zero_value_is_set_not_absent() {
        let errs = evaluate(
            &[FieldRule::float_range("latitude", -90.0, 90.0)],
            &json!({ "latitude": 0.0 }),
        );
        assert!(errs.is_empty());
    }

    #[test]
    fn non_numeric_value_fails_range() {
        let errs = evaluate(
            &[FieldRule::float_range("latitude", -90.0, 90.0)],
            &json!({ "latitude": "north" }),
        );
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let entity = json!({
            "name": "bad!",
            "latitude": 500.0,
            "longitude": -500.0
        });
        let first = evaluate(&rules(), &entity).to_string();
        for _ in 0..10 {
            assert_eq!(evaluate(&rules(), &entity).to_string(), first);
        }
    }
}
