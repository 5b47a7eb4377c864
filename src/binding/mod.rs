//! Parameter binding module
//!
//! Extracts raw values from the three declared sources (path captures,
//! query string, decoded body), coerces them to their declared types,
//! evaluates constraints, and aggregates every failure into a single
//! `ValidationError`. Binding never short-circuits: all fields are
//! attempted so the caller sees the complete failure set in one response.

mod coerce;
pub mod query;

pub use coerce::{coerce_json, coerce_str};

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::routing::{PathCaptures, RouteSpec};
use crate::schema::{decode_field, BoundValue, FieldSpec, FieldType, ModelSpec};
use crate::validate::{
    evaluate_all, FieldError, FieldErrorKind, Location, ValidationError,
};

/// The fully validated, typed result of binding one request to one route
pub struct BoundRequest<'a> {
    pub route: &'a RouteSpec,
    values: BTreeMap<String, BoundValue>,
}

impl std::fmt::Debug for BoundRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRequest")
            .field("route", &self.route.name)
            .field("values", &self.values)
            .finish()
    }
}

impl BoundRequest<'_> {
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    /// Integer argument; `None` when absent or bound to null
    pub fn int_arg(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(BoundValue::as_int)
    }

    pub fn float_arg(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(BoundValue::as_number)
    }

    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(BoundValue::as_str)
    }

    pub fn bool_arg(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(BoundValue::as_bool)
    }

    /// Argument as JSON; `None` when absent or bound to null
    pub fn json_arg(&self, name: &str) -> Option<Json> {
        match self.values.get(name) {
            None | Some(BoundValue::Null) => None,
            Some(value) => Some(value.to_json()),
        }
    }
}

/// Bind every declared field of the resolved route
pub fn bind<'a>(
    route: &'a RouteSpec,
    captures: &PathCaptures,
    query: Option<&str>,
    body: &[u8],
) -> Result<BoundRequest<'a>, ValidationError> {
    let mut errors = Vec::new();
    let mut values = BTreeMap::new();

    let pairs = query::parse(query.unwrap_or(""));
    for spec in &route.params {
        match spec.source {
            Location::Path => bind_path_field(spec, captures, &mut values, &mut errors),
            Location::Query => bind_query_field(spec, &pairs, &mut values, &mut errors),
            // body fields are declared on the route's body model
            Location::Body => {}
        }
    }

    if let Some(model) = &route.body {
        bind_body(model, body, &mut values, &mut errors);
    }

    if errors.is_empty() {
        Ok(BoundRequest { route, values })
    } else {
        Err(ValidationError::new(errors))
    }
}

fn bind_path_field(
    spec: &FieldSpec,
    captures: &PathCaptures,
    values: &mut BTreeMap<String, BoundValue>,
    errors: &mut Vec<FieldError>,
) {
    // registration guarantees a capture for every path field
    let Some(raw) = captures.get(&spec.name) else {
        errors.push(FieldError::new(
            Location::Path,
            spec.name.clone(),
            FieldErrorKind::Missing,
            "field required",
        ));
        return;
    };
    bind_token(spec, raw, Location::Path, values, errors);
}

fn bind_query_field(
    spec: &FieldSpec,
    pairs: &[(String, String)],
    values: &mut BTreeMap<String, BoundValue>,
    errors: &mut Vec<FieldError>,
) {
    let key = spec.lookup_key();

    // a List-typed query field collects every repetition of its key
    if let FieldType::List(element) = &spec.ty {
        let found = query::all(pairs, key);
        if found.is_empty() {
            apply_default(spec, Location::Query, values, errors);
            return;
        }
        let mut items = Vec::with_capacity(found.len());
        let mut complete = true;
        for (index, raw) in found.iter().enumerate() {
            match coerce_str(raw, element) {
                Ok(value) => items.push(value),
                Err(message) => {
                    errors.push(FieldError::new(
                        Location::Query,
                        format!("{key}.{index}"),
                        FieldErrorKind::Conversion,
                        message,
                    ));
                    complete = false;
                }
            }
        }
        if complete {
            let value = BoundValue::List(items);
            push_constraint_errors(spec, &value, Location::Query, errors);
            values.insert(spec.name.clone(), value);
        }
        return;
    }

    match query::first(pairs, key) {
        Some(raw) => bind_token(spec, raw, Location::Query, values, errors),
        None => apply_default(spec, Location::Query, values, errors),
    }
}

/// Coerce a single raw token and run the field's constraints
fn bind_token(
    spec: &FieldSpec,
    raw: &str,
    location: Location,
    values: &mut BTreeMap<String, BoundValue>,
    errors: &mut Vec<FieldError>,
) {
    match coerce_str(raw, &spec.ty) {
        Ok(value) => {
            push_constraint_errors(spec, &value, location, errors);
            values.insert(spec.name.clone(), value);
        }
        Err(message) => errors.push(FieldError::new(
            location,
            spec.lookup_key(),
            FieldErrorKind::Conversion,
            message,
        )),
    }
}

fn bind_body(
    model: &ModelSpec,
    body: &[u8],
    values: &mut BTreeMap<String, BoundValue>,
    errors: &mut Vec<FieldError>,
) {
    // an empty body behaves as all-absent: defaults apply, required fields fail
    if body.is_empty() {
        for field in &model.fields {
            apply_default(field, Location::Body, values, errors);
        }
        return;
    }

    let raw: Json = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            errors.push(FieldError::new(
                Location::Body,
                "",
                FieldErrorKind::Conversion,
                format!("invalid JSON body: {e}"),
            ));
            return;
        }
    };

    // exactly one non-embedded body field consumes the whole decoded body;
    // otherwise every field reads its own key of the implicit body object
    if let [field] = model.fields.as_slice() {
        if !field.embed {
            if let Some(value) = decode_field(field, "", &raw, errors) {
                values.insert(field.name.clone(), value);
            }
            return;
        }
    }

    let Some(object) = raw.as_object() else {
        errors.push(FieldError::new(
            Location::Body,
            "",
            FieldErrorKind::Conversion,
            "value is not a valid object",
        ));
        return;
    };
    for field in &model.fields {
        match object.get(field.lookup_key()) {
            Some(value) => {
                if let Some(decoded) = decode_field(field, field.lookup_key(), value, errors) {
                    values.insert(field.name.clone(), decoded);
                }
            }
            None => apply_default(field, Location::Body, values, errors),
        }
    }
}

/// Absent field: a fresh clone of the default, or a `missing` failure
fn apply_default(
    spec: &FieldSpec,
    location: Location,
    values: &mut BTreeMap<String, BoundValue>,
    errors: &mut Vec<FieldError>,
) {
    match &spec.default {
        Some(default) => {
            values.insert(spec.name.clone(), default.clone());
        }
        None => errors.push(FieldError::new(
            location,
            spec.lookup_key(),
            FieldErrorKind::Missing,
            "field required",
        )),
    }
}

fn push_constraint_errors(
    spec: &FieldSpec,
    value: &BoundValue,
    location: Location,
    errors: &mut Vec<FieldError>,
) {
    for message in evaluate_all(value, &spec.constraints) {
        errors.push(FieldError::new(
            location,
            spec.lookup_key(),
            FieldErrorKind::Constraint,
            message,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper::Method;
    use serde_json::json;

    use crate::validate::Constraint;

    use super::*;

    fn capture(name: &str, value: &str) -> PathCaptures {
        let mut captures = PathCaptures::default();
        captures.push(name, value.to_string());
        captures
    }

    fn item_model() -> Arc<ModelSpec> {
        Arc::new(ModelSpec::new(
            "Item",
            vec![
                FieldSpec::body("name", FieldType::Str),
                FieldSpec::body("price", FieldType::Float).constrained(Constraint::Gt(0.0)),
                FieldSpec::body("tax", FieldType::Float).optional(),
            ],
        ))
    }

    fn item_route() -> RouteSpec {
        RouteSpec::new("get_item", Method::GET, "/items/{item_id}", |_| json!(null))
            .unwrap()
            .param(
                FieldSpec::path("item_id", FieldType::Int).constrained(Constraint::Ge(1.0)),
            )
            .param(FieldSpec::query("needy", FieldType::Str))
            .param(
                FieldSpec::query("q", FieldType::Str)
                    .optional()
                    .constrained(Constraint::MaxLength(5)),
            )
            .param(
                FieldSpec::query("short", FieldType::Bool).with_default(BoundValue::Bool(false)),
            )
    }

    #[test]
    fn test_bind_happy_path() {
        let route = item_route();
        let bound = bind(
            &route,
            &capture("item_id", "3"),
            Some("needy=yes&q=abc&short=1"),
            b"",
        )
        .unwrap();
        assert_eq!(bound.int_arg("item_id"), Some(3));
        assert_eq!(bound.str_arg("needy"), Some("yes"));
        assert_eq!(bound.str_arg("q"), Some("abc"));
        assert_eq!(bound.bool_arg("short"), Some(true));
    }

    #[test]
    fn test_bind_applies_defaults_and_nulls() {
        let route = item_route();
        let bound = bind(&route, &capture("item_id", "3"), Some("needy=x"), b"").unwrap();
        assert_eq!(bound.bool_arg("short"), Some(false));
        assert_eq!(bound.value("q"), Some(&BoundValue::Null));
        assert_eq!(bound.str_arg("q"), None);
    }

    #[test]
    fn test_bind_aggregates_failures_across_sources() {
        let route = item_route();
        // bad path int, missing required query, over-long q
        let err = bind(
            &route,
            &capture("item_id", "zero"),
            Some("q=toolong"),
            b"",
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert_eq!(err.errors[0].location, Location::Path);
        assert_eq!(err.errors[0].kind, FieldErrorKind::Conversion);
        assert_eq!(err.errors[1].location, Location::Query);
        assert_eq!(err.errors[1].field, "needy");
        assert_eq!(err.errors[1].kind, FieldErrorKind::Missing);
        assert_eq!(err.errors[2].field, "q");
        assert_eq!(err.errors[2].kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn test_alias_is_authoritative_when_declared() {
        let route = RouteSpec::new("get_user", Method::GET, "/users", |_| json!(null))
            .unwrap()
            .param(
                FieldSpec::query("q", FieldType::List(Box::new(FieldType::Str)))
                    .aliased("item-query")
                    .with_default(BoundValue::List(vec![
                        BoundValue::Str("foo".to_string()),
                        BoundValue::Str("bar".to_string()),
                    ]))
                    .deprecated(),
            );

        let bound = bind(&route, &PathCaptures::default(), Some("item-query=a&item-query=b"), b"")
            .unwrap();
        assert_eq!(
            bound.json_arg("q"),
            Some(json!(["a", "b"]))
        );

        // the internal name is not consulted once an alias is declared
        let bound = bind(&route, &PathCaptures::default(), Some("q=a"), b"").unwrap();
        assert_eq!(bound.json_arg("q"), Some(json!(["foo", "bar"])));
    }

    #[test]
    fn test_repeated_default_is_fresh_per_request() {
        let route = RouteSpec::new("get_user", Method::GET, "/users", |_| json!(null))
            .unwrap()
            .param(
                FieldSpec::query("q", FieldType::List(Box::new(FieldType::Str)))
                    .with_default(BoundValue::List(vec![BoundValue::Str("foo".to_string())])),
            );
        let first = bind(&route, &PathCaptures::default(), None, b"").unwrap();
        let second = bind(&route, &PathCaptures::default(), None, b"").unwrap();
        assert_eq!(first.json_arg("q"), second.json_arg("q"));
    }

    #[test]
    fn test_whole_body_binds_single_plain_field() {
        let route = RouteSpec::new("create_item", Method::POST, "/items", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())));
        let body = br#"{"name": "Hammer", "price": 9.5}"#;
        let bound = bind(&route, &PathCaptures::default(), None, body).unwrap();
        assert_eq!(
            bound.json_arg("item"),
            Some(json!({"name": "Hammer", "price": 9.5, "tax": null}))
        );
    }

    #[test]
    fn test_whole_body_failures_are_unprefixed() {
        let route = RouteSpec::new("create_item", Method::POST, "/items", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())));
        let err = bind(
            &route,
            &PathCaptures::default(),
            None,
            br#"{"name": "Hammer", "price": 0}"#,
        )
        .unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "price");
    }

    #[test]
    fn test_embedded_body_field_reads_its_own_key() {
        let route = RouteSpec::new("update_item", Method::PUT, "/items", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())).embedded());
        let body = br#"{"item": {"name": "Hammer", "price": 9.5}}"#;
        let bound = bind(&route, &PathCaptures::default(), None, body).unwrap();
        assert_eq!(
            bound.json_arg("item"),
            Some(json!({"name": "Hammer", "price": 9.5, "tax": null}))
        );

        // failures inside an embedded field carry the field-name prefix
        let err = bind(
            &route,
            &PathCaptures::default(),
            None,
            br#"{"item": {"name": "Hammer", "price": 0}}"#,
        )
        .unwrap_err();
        assert_eq!(err.errors[0].field, "item.price");
    }

    #[test]
    fn test_sibling_body_fields_merge_under_one_object() {
        let route = RouteSpec::new("update", Method::PUT, "/itemz", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())))
            .body_field(
                FieldSpec::body("importance", FieldType::Int).constrained(Constraint::Gt(0.0)),
            );
        let body = br#"{"item": {"name": "Hammer", "price": 9.5}, "importance": 5}"#;
        let bound = bind(&route, &PathCaptures::default(), None, body).unwrap();
        assert_eq!(bound.int_arg("importance"), Some(5));

        let err = bind(
            &route,
            &PathCaptures::default(),
            None,
            br#"{"importance": 0}"#,
        )
        .unwrap_err();
        // item missing, importance out of range: both reported together
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].field, "item");
        assert_eq!(err.errors[0].kind, FieldErrorKind::Missing);
        assert_eq!(err.errors[1].field, "importance");
        assert_eq!(err.errors[1].kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn test_empty_body_fails_required_fields_only() {
        let route = RouteSpec::new("create_item", Method::POST, "/items", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())));
        let err = bind(&route, &PathCaptures::default(), None, b"").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "item");
        assert_eq!(err.errors[0].kind, FieldErrorKind::Missing);
    }

    #[test]
    fn test_undecodable_body_is_one_failure() {
        let route = RouteSpec::new("create_item", Method::POST, "/items", |_| json!(null))
            .unwrap()
            .body_field(FieldSpec::body("item", FieldType::Model(item_model())));
        let err = bind(&route, &PathCaptures::default(), None, b"{not json").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].location, Location::Body);
        assert!(err.errors[0].message.starts_with("invalid JSON body"));
    }
}
