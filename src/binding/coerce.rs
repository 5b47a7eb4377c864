//! Raw-value coercion into typed values
//!
//! A conversion failure is reported as data, never a panic; the failure
//! reason becomes the message of a `type_error` entry.

use serde_json::Value as Json;

use crate::schema::{BoundValue, FieldType};

/// Convert a raw string token (path segment, query value) to the declared
/// scalar type
pub fn coerce_str(raw: &str, ty: &FieldType) -> Result<BoundValue, String> {
    match ty {
        FieldType::Str => Ok(BoundValue::Str(raw.to_string())),
        FieldType::Int => raw
            .parse::<i64>()
            .map(BoundValue::Int)
            .map_err(|_| "value is not a valid integer".to_string()),
        FieldType::Float => raw
            .parse::<f64>()
            .map(BoundValue::Float)
            .map_err(|_| "value is not a valid float".to_string()),
        FieldType::Bool => coerce_bool_token(raw),
        FieldType::Url => coerce_url(raw),
        // membership is enforced by the field's OneOf constraint
        FieldType::Enum(_) => Ok(BoundValue::Str(raw.to_string())),
        FieldType::Model(_) | FieldType::List(_) | FieldType::Set(_) | FieldType::Map(..) => Err(
            format!("cannot parse a {} from a plain string", ty.name()),
        ),
    }
}

/// Convert a scalar JSON value to the declared type
///
/// Accepts the native JSON type or a string coercible under the token
/// rules; `Str` fields accept only JSON strings so numbers are never
/// silently stringified. Structured types are handled by schema decoding.
pub fn coerce_json(raw: &Json, ty: &FieldType) -> Result<BoundValue, String> {
    match ty {
        FieldType::Str => raw
            .as_str()
            .map(|s| BoundValue::Str(s.to_string()))
            .ok_or_else(|| "str type expected".to_string()),
        FieldType::Int => match raw {
            Json::Number(n) => n
                .as_i64()
                .map(BoundValue::Int)
                .ok_or_else(|| "value is not a valid integer".to_string()),
            Json::String(s) => coerce_str(s, ty),
            _ => Err("value is not a valid integer".to_string()),
        },
        FieldType::Float => match raw {
            Json::Number(n) => n
                .as_f64()
                .map(BoundValue::Float)
                .ok_or_else(|| "value is not a valid float".to_string()),
            Json::String(s) => coerce_str(s, ty),
            _ => Err("value is not a valid float".to_string()),
        },
        FieldType::Bool => match raw {
            Json::Bool(b) => Ok(BoundValue::Bool(*b)),
            Json::String(s) => coerce_str(s, ty),
            _ => Err("value could not be parsed to a boolean".to_string()),
        },
        FieldType::Url | FieldType::Enum(_) => match raw.as_str() {
            Some(s) => coerce_str(s, ty),
            None => Err("str type expected".to_string()),
        },
        FieldType::Model(_) | FieldType::List(_) | FieldType::Set(_) | FieldType::Map(..) => {
            Err(format!("{} requires structured decoding", ty.name()))
        }
    }
}

/// Fixed boolean token set, ASCII case-insensitive
fn coerce_bool_token(raw: &str) -> Result<BoundValue, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(BoundValue::Bool(true)),
        "false" | "0" | "no" | "off" => Ok(BoundValue::Bool(false)),
        _ => Err("value could not be parsed to a boolean".to_string()),
    }
}

/// Validate an http/https URL, keeping its string form
fn coerce_url(raw: &str) -> Result<BoundValue, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid or missing URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(BoundValue::Str(raw.to_string())),
        other => Err(format!("URL scheme should be http or https, not {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_tokens() {
        assert_eq!(
            coerce_str("42", &FieldType::Int).unwrap(),
            BoundValue::Int(42)
        );
        assert_eq!(
            coerce_str("-7", &FieldType::Int).unwrap(),
            BoundValue::Int(-7)
        );
        assert!(coerce_str("4.2", &FieldType::Int).is_err());
        assert!(coerce_str("abc", &FieldType::Int).is_err());
        assert_eq!(
            coerce_str("0.01", &FieldType::Float).unwrap(),
            BoundValue::Float(0.01)
        );
    }

    #[test]
    fn test_bool_token_set() {
        for token in ["true", "1", "yes", "on", "True", "YES"] {
            assert_eq!(
                coerce_str(token, &FieldType::Bool).unwrap(),
                BoundValue::Bool(true),
                "token {token}"
            );
        }
        for token in ["false", "0", "no", "off", "False"] {
            assert_eq!(
                coerce_str(token, &FieldType::Bool).unwrap(),
                BoundValue::Bool(false),
                "token {token}"
            );
        }
        assert!(coerce_str("maybe", &FieldType::Bool).is_err());
        assert!(coerce_str("", &FieldType::Bool).is_err());
    }

    #[test]
    fn test_url_requires_http_scheme() {
        assert!(coerce_str("https://example.com/a.png", &FieldType::Url).is_ok());
        assert!(coerce_str("http://example.com", &FieldType::Url).is_ok());
        assert!(coerce_str("ftp://example.com", &FieldType::Url).is_err());
        assert!(coerce_str("not a url", &FieldType::Url).is_err());
    }

    #[test]
    fn test_json_str_rejects_numbers() {
        assert!(coerce_json(&serde_json::json!(12), &FieldType::Str).is_err());
        assert_eq!(
            coerce_json(&serde_json::json!("12"), &FieldType::Str).unwrap(),
            BoundValue::Str("12".to_string())
        );
    }

    #[test]
    fn test_json_numbers_accept_string_form() {
        assert_eq!(
            coerce_json(&serde_json::json!("5"), &FieldType::Int).unwrap(),
            BoundValue::Int(5)
        );
        assert_eq!(
            coerce_json(&serde_json::json!(2.5), &FieldType::Float).unwrap(),
            BoundValue::Float(2.5)
        );
        assert!(coerce_json(&serde_json::json!(2.5), &FieldType::Int).is_err());
    }
}
