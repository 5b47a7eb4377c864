//! Structured JSON decoding against a `ModelSpec`
//!
//! Produces a fully typed value tree or every field-level failure in one
//! pass, with dotted paths (`items.0.price`) so each failure can be
//! localized without another round trip.

use serde_json::Value as Json;

use crate::binding::{coerce_json, coerce_str};
use crate::validate::{evaluate_all, FieldError, FieldErrorKind, Location};

use super::spec::{FieldSpec, FieldType, ModelSpec};
use super::value::BoundValue;

impl ModelSpec {
    /// Decode a raw structured value into a typed tree
    ///
    /// Every field is attempted; failures accumulate instead of
    /// short-circuiting. Unknown keys in the input are ignored. Missing
    /// optional fields receive a fresh clone of their declared default, so
    /// defaults are explicit in the output.
    pub fn decode(&self, raw: &Json) -> Result<BoundValue, Vec<FieldError>> {
        let mut errors = Vec::new();
        let value = decode_model(self, "", raw, &mut errors);
        if errors.is_empty() {
            Ok(value.unwrap_or_else(|| BoundValue::Model(Vec::new())))
        } else {
            Err(errors)
        }
    }
}

pub(crate) fn decode_model(
    model: &ModelSpec,
    prefix: &str,
    raw: &Json,
    errors: &mut Vec<FieldError>,
) -> Option<BoundValue> {
    let Some(object) = raw.as_object() else {
        errors.push(FieldError::new(
            Location::Body,
            prefix,
            FieldErrorKind::Conversion,
            "value is not a valid object",
        ));
        return None;
    };

    let mut fields = Vec::with_capacity(model.fields.len());
    let mut complete = true;
    for field in &model.fields {
        let path = join_path(prefix, field.lookup_key());
        match object.get(field.lookup_key()) {
            None => match &field.default {
                Some(default) => fields.push((field.name.clone(), default.clone())),
                None => {
                    errors.push(FieldError::new(
                        Location::Body,
                        path,
                        FieldErrorKind::Missing,
                        "field required",
                    ));
                    complete = false;
                }
            },
            Some(value) => match decode_field(field, &path, value, errors) {
                Some(decoded) => fields.push((field.name.clone(), decoded)),
                None => complete = false,
            },
        }
    }
    complete.then(|| BoundValue::Model(fields))
}

/// Decode one present field value, applying its constraints
///
/// Constraint violations are recorded but still yield the decoded value;
/// `None` means no usable value could be produced at all.
pub(crate) fn decode_field(
    field: &FieldSpec,
    path: &str,
    raw: &Json,
    errors: &mut Vec<FieldError>,
) -> Option<BoundValue> {
    if raw.is_null() {
        if field.nullable {
            // null is a declared state, not a value to constrain
            return Some(BoundValue::Null);
        }
        errors.push(FieldError::new(
            Location::Body,
            path,
            FieldErrorKind::Conversion,
            "none is not an allowed value",
        ));
        return None;
    }

    let value = decode_type(path, raw, &field.ty, errors)?;
    for message in evaluate_all(&value, &field.constraints) {
        errors.push(FieldError::new(
            Location::Body,
            path,
            FieldErrorKind::Constraint,
            message,
        ));
    }
    Some(value)
}

fn decode_type(
    path: &str,
    raw: &Json,
    ty: &FieldType,
    errors: &mut Vec<FieldError>,
) -> Option<BoundValue> {
    match ty {
        FieldType::Model(model) => decode_model(model, path, raw, errors),
        FieldType::List(inner) => {
            let items = expect_array(path, raw, "value is not a valid list", errors)?;
            let mut out = Vec::with_capacity(items.len());
            let mut complete = true;
            for (index, item) in items.iter().enumerate() {
                let item_path = join_path(path, &index.to_string());
                match decode_type(&item_path, item, inner, errors) {
                    Some(value) => out.push(value),
                    None => complete = false,
                }
            }
            complete.then_some(BoundValue::List(out))
        }
        FieldType::Set(inner) => {
            let items = expect_array(path, raw, "value is not a valid set", errors)?;
            let mut out: Vec<BoundValue> = Vec::new();
            let mut complete = true;
            for (index, item) in items.iter().enumerate() {
                let item_path = join_path(path, &index.to_string());
                match decode_type(&item_path, item, inner, errors) {
                    Some(value) => {
                        if !out.contains(&value) {
                            out.push(value);
                        }
                    }
                    None => complete = false,
                }
            }
            complete.then_some(BoundValue::Set(out))
        }
        FieldType::Map(key_ty, value_ty) => {
            let Some(object) = raw.as_object() else {
                errors.push(FieldError::new(
                    Location::Body,
                    path,
                    FieldErrorKind::Conversion,
                    "value is not a valid dict",
                ));
                return None;
            };
            let mut entries = Vec::with_capacity(object.len());
            let mut complete = true;
            for (key, value) in object {
                let entry_path = join_path(path, key);
                let decoded_key = match coerce_str(key, key_ty) {
                    Ok(k) => Some(k),
                    Err(message) => {
                        errors.push(FieldError::new(
                            Location::Body,
                            entry_path.clone(),
                            FieldErrorKind::Conversion,
                            format!("invalid key: {message}"),
                        ));
                        complete = false;
                        None
                    }
                };
                let decoded_value = decode_type(&entry_path, value, value_ty, errors);
                match (decoded_key, decoded_value) {
                    (Some(k), Some(v)) => entries.push((k, v)),
                    _ => complete = false,
                }
            }
            complete.then_some(BoundValue::Map(entries))
        }
        _ => match coerce_json(raw, ty) {
            Ok(value) => Some(value),
            Err(message) => {
                errors.push(FieldError::new(
                    Location::Body,
                    path,
                    FieldErrorKind::Conversion,
                    message,
                ));
                None
            }
        },
    }
}

fn expect_array<'a>(
    path: &str,
    raw: &'a Json,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Vec<Json>> {
    match raw.as_array() {
        Some(items) => Some(items),
        None => {
            errors.push(FieldError::new(
                Location::Body,
                path,
                FieldErrorKind::Conversion,
                message,
            ));
            None
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::validate::Constraint;

    use super::*;

    fn image_model() -> Arc<ModelSpec> {
        Arc::new(ModelSpec::new(
            "Image",
            vec![
                FieldSpec::body("url", FieldType::Url),
                FieldSpec::body("name", FieldType::Str),
            ],
        ))
    }

    fn item_model() -> Arc<ModelSpec> {
        Arc::new(ModelSpec::new(
            "Item",
            vec![
                FieldSpec::body("name", FieldType::Str),
                FieldSpec::body("description", FieldType::Str)
                    .optional()
                    .constrained(Constraint::MaxLength(20)),
                FieldSpec::body("price", FieldType::Float).constrained(Constraint::Gt(0.0)),
                FieldSpec::body("tax", FieldType::Float).optional(),
                FieldSpec::body("tags", FieldType::Set(Box::new(FieldType::Str)))
                    .with_default(BoundValue::Set(Vec::new())),
                FieldSpec::body(
                    "images",
                    FieldType::List(Box::new(FieldType::Model(image_model()))),
                )
                .optional(),
            ],
        ))
    }

    fn offer_model() -> ModelSpec {
        ModelSpec::new(
            "Offer",
            vec![
                FieldSpec::body("name", FieldType::Str),
                FieldSpec::body("description", FieldType::Str).optional(),
                FieldSpec::body("price", FieldType::Float),
                FieldSpec::body(
                    "items",
                    FieldType::List(Box::new(FieldType::Model(item_model()))),
                ),
            ],
        )
    }

    #[test]
    fn test_decode_makes_defaults_explicit() {
        let decoded = item_model()
            .decode(&json!({"name": "Hammer", "price": 9.5}))
            .unwrap();
        assert_eq!(
            decoded.to_json(),
            json!({
                "name": "Hammer",
                "description": null,
                "price": 9.5,
                "tax": null,
                "tags": [],
                "images": null,
            })
        );
    }

    #[test]
    fn test_decode_round_trip_is_lossless() {
        let raw = json!({
            "name": "Hammer",
            "description": "claw hammer",
            "price": 9.5,
            "tax": 1.2,
            "tags": ["tools", "hardware"],
            "images": [{"url": "https://example.com/a.png", "name": "front"}],
        });
        let decoded = item_model().decode(&raw).unwrap();
        assert_eq!(decoded.to_json(), raw);
    }

    #[test]
    fn test_decode_collects_inner_and_outer_failures_together() {
        // missing outer field and an invalid nested price: two entries
        let result = offer_model().decode(&json!({
            "price": 20.0,
            "items": [{"name": "Hammer", "price": 0}],
        }));
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].kind, FieldErrorKind::Missing);
        assert_eq!(errors[1].field, "items.0.price");
        assert_eq!(errors[1].kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let decoded = item_model()
            .decode(&json!({"name": "Hammer", "price": 1.0, "color": "red"}))
            .unwrap();
        let json = decoded.to_json();
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_set_field_deduplicates() {
        let decoded = item_model()
            .decode(&json!({"name": "Hammer", "price": 1.0, "tags": ["a", "b", "a"]}))
            .unwrap();
        let json = decoded.to_json();
        assert_eq!(json["tags"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_null_rejected_for_non_nullable_field() {
        let errors = item_model()
            .decode(&json!({"name": null, "price": 1.0}))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].kind, FieldErrorKind::Conversion);
    }

    #[test]
    fn test_map_keys_are_coerced_to_declared_type() {
        let weights = ModelSpec::new(
            "Weights",
            vec![FieldSpec::body(
                "weights",
                FieldType::Map(Box::new(FieldType::Int), Box::new(FieldType::Float)),
            )],
        );
        let decoded = weights
            .decode(&json!({"weights": {"1": 0.5, "2": 1.5}}))
            .unwrap();
        assert_eq!(decoded.to_json(), json!({"weights": {"1": 0.5, "2": 1.5}}));

        let errors = weights
            .decode(&json!({"weights": {"oops": 0.5}}))
            .unwrap_err();
        assert_eq!(errors[0].field, "weights.oops");
    }

    #[test]
    fn test_non_object_input_is_one_failure() {
        let errors = item_model().decode(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "");
        assert_eq!(errors[0].message, "value is not a valid object");
    }
}
