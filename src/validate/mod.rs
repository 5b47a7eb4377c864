//! Constraint evaluation module
//!
//! Pure checks of a single bound value against declared constraints, plus
//! the shared failure vocabulary used by schema decoding, parameter binding,
//! and dispatch.

use std::fmt;

use regex::Regex;

use crate::schema::BoundValue;

/// Where a parameter is drawn from (and where a failure is reported)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure category, serialized as the `type` field of an error entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Required field absent with no default
    Missing,
    /// Raw value could not be coerced to the declared type
    Conversion,
    /// Coerced value violates one of the declared constraints
    Constraint,
}

impl FieldErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Conversion => "type_error",
            Self::Constraint => "value_error",
        }
    }
}

/// One field-level failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub location: Location,
    /// Dotted path to the failing field (e.g. `items.0.price`); empty for
    /// failures about the payload as a whole
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(
        location: Location,
        field: impl Into<String>,
        kind: FieldErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Every field-level failure of one request, aggregated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Serialize as a `{"detail": [...]}` payload, one entry per failure
    pub fn to_json(&self) -> serde_json::Value {
        let detail: Vec<serde_json::Value> = self
            .errors
            .iter()
            .map(|e| {
                let mut loc = vec![serde_json::Value::from(e.location.as_str())];
                if !e.field.is_empty() {
                    loc.extend(e.field.split('.').map(serde_json::Value::from));
                }
                serde_json::json!({
                    "loc": loc,
                    "msg": e.message,
                    "type": e.kind.as_str(),
                })
            })
            .collect();
        serde_json::json!({ "detail": detail })
    }
}

/// Full-string regular-expression pattern
///
/// The source is compiled with explicit `\A(?:...)\z` anchoring so that
/// evaluation is always a whole-string match, never a substring search.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("\\A(?:{source})\\z"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A single declared constraint; a field may carry several, all must pass
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Exclusive numeric lower bound
    Gt(f64),
    /// Inclusive numeric lower bound
    Ge(f64),
    /// Exclusive numeric upper bound
    Lt(f64),
    /// Inclusive numeric upper bound
    Le(f64),
    /// Minimum string length, counted in characters
    MinLength(usize),
    /// Maximum string length, counted in characters
    MaxLength(usize),
    /// Full-string regular expression match
    Pattern(Pattern),
    /// Exact, case-sensitive membership in a closed literal set
    OneOf(Vec<String>),
}

/// Check one value against one constraint, returning the failure reason
pub fn evaluate(value: &BoundValue, constraint: &Constraint) -> Result<(), String> {
    match constraint {
        Constraint::Gt(bound) => check_number(value, |n| n > *bound, || {
            format!("ensure this value is greater than {bound}")
        }),
        Constraint::Ge(bound) => check_number(value, |n| n >= *bound, || {
            format!("ensure this value is greater than or equal to {bound}")
        }),
        Constraint::Lt(bound) => check_number(value, |n| n < *bound, || {
            format!("ensure this value is less than {bound}")
        }),
        Constraint::Le(bound) => check_number(value, |n| n <= *bound, || {
            format!("ensure this value is less than or equal to {bound}")
        }),
        Constraint::MinLength(min) => check_str(value, |s| {
            if s.chars().count() >= *min {
                Ok(())
            } else {
                Err(format!("ensure this value has at least {min} characters"))
            }
        }),
        Constraint::MaxLength(max) => check_str(value, |s| {
            if s.chars().count() <= *max {
                Ok(())
            } else {
                Err(format!("ensure this value has at most {max} characters"))
            }
        }),
        Constraint::Pattern(pattern) => check_str(value, |s| {
            if pattern.matches(s) {
                Ok(())
            } else {
                Err(format!(
                    "string does not match pattern \"{}\"",
                    pattern.source()
                ))
            }
        }),
        Constraint::OneOf(members) => check_str(value, |s| {
            if members.iter().any(|m| m == s) {
                Ok(())
            } else {
                Err(format!(
                    "value is not a valid enumeration member; permitted: {}",
                    members.join(", ")
                ))
            }
        }),
    }
}

/// Check a value against every constraint, collecting all failure reasons
pub fn evaluate_all(value: &BoundValue, constraints: &[Constraint]) -> Vec<String> {
    constraints
        .iter()
        .filter_map(|c| evaluate(value, c).err())
        .collect()
}

fn check_number(
    value: &BoundValue,
    pred: impl Fn(f64) -> bool,
    reason: impl Fn() -> String,
) -> Result<(), String> {
    match value.as_number() {
        Some(n) if pred(n) => Ok(()),
        Some(_) => Err(reason()),
        None => Err("numeric constraint applied to a non-numeric value".to_string()),
    }
}

fn check_str(
    value: &BoundValue,
    check: impl Fn(&str) -> Result<(), String>,
) -> Result<(), String> {
    match value.as_str() {
        Some(s) => check(s),
        None => Err("string constraint applied to a non-string value".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gt_zero_rejects_zero_and_negative() {
        let gt = Constraint::Gt(0.0);
        assert!(evaluate(&BoundValue::Float(0.0), &gt).is_err());
        assert!(evaluate(&BoundValue::Float(-3.5), &gt).is_err());
        assert!(evaluate(&BoundValue::Int(0), &gt).is_err());
        assert!(evaluate(&BoundValue::Int(-1), &gt).is_err());
        assert!(evaluate(&BoundValue::Float(0.01), &gt).is_ok());
    }

    #[test]
    fn test_bounds_are_conjunctive() {
        let constraints = vec![Constraint::Gt(0.0), Constraint::Le(5.0)];
        assert!(evaluate_all(&BoundValue::Int(3), &constraints).is_empty());
        assert_eq!(evaluate_all(&BoundValue::Int(0), &constraints).len(), 1);
        assert_eq!(evaluate_all(&BoundValue::Int(6), &constraints).len(), 1);
    }

    #[test]
    fn test_inclusive_vs_exclusive_bounds() {
        assert!(evaluate(&BoundValue::Int(1), &Constraint::Ge(1.0)).is_ok());
        assert!(evaluate(&BoundValue::Int(1), &Constraint::Gt(1.0)).is_err());
        assert!(evaluate(&BoundValue::Int(5), &Constraint::Le(5.0)).is_ok());
        assert!(evaluate(&BoundValue::Int(5), &Constraint::Lt(5.0)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let max = Constraint::MaxLength(3);
        // three characters, nine bytes
        assert!(evaluate(&BoundValue::Str("日本語".to_string()), &max).is_ok());
        assert!(evaluate(&BoundValue::Str("abcd".to_string()), &max).is_err());

        let min = Constraint::MinLength(2);
        assert!(evaluate(&BoundValue::Str("a".to_string()), &min).is_err());
        assert!(evaluate(&BoundValue::Str("ab".to_string()), &min).is_ok());
    }

    #[test]
    fn test_pattern_matches_whole_string_only() {
        let pattern = Constraint::Pattern(Pattern::new("[abc]\\w+q").unwrap());
        assert!(evaluate(&BoundValue::Str("abcq".to_string()), &pattern).is_ok());
        // substring hits must not pass
        assert!(evaluate(&BoundValue::Str("xabcqx".to_string()), &pattern).is_err());
        assert!(evaluate(&BoundValue::Str("abcq trailing".to_string()), &pattern).is_err());
    }

    #[test]
    fn test_oneof_is_exact_and_case_sensitive() {
        let members = Constraint::OneOf(vec!["alexnet".to_string(), "resnet".to_string()]);
        assert!(evaluate(&BoundValue::Str("alexnet".to_string()), &members).is_ok());
        assert!(evaluate(&BoundValue::Str("AlexNet".to_string()), &members).is_err());
        assert!(evaluate(&BoundValue::Str("vgg".to_string()), &members).is_err());
    }

    #[test]
    fn test_validation_error_to_json() {
        let err = ValidationError::new(vec![
            FieldError::new(
                Location::Query,
                "needy",
                FieldErrorKind::Missing,
                "field required",
            ),
            FieldError::new(
                Location::Body,
                "items.0.price",
                FieldErrorKind::Constraint,
                "ensure this value is greater than 0",
            ),
        ]);
        let json = err.to_json();
        let detail = json["detail"].as_array().unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0]["loc"], serde_json::json!(["query", "needy"]));
        assert_eq!(detail[0]["type"], "missing");
        assert_eq!(
            detail[1]["loc"],
            serde_json::json!(["body", "items", "0", "price"])
        );
    }
}
