//! Demo application module
//!
//! Declares the demonstration endpoint set: model specs, the ordered route
//! table, and handler bodies over an in-memory item list. Registration
//! order is part of the behavior: overlapping templates resolve to the
//! first registered match.

mod handlers;
mod models;

use std::error::Error;
use std::sync::Arc;

use hyper::Method;

use crate::routing::{RouteSet, RouteSpec};
use crate::schema::{BoundValue, FieldSpec, FieldType};
use crate::validate::{Constraint, Pattern};

/// Build the registered route table; called once at startup
#[allow(clippy::too_many_lines)]
pub fn build_routes() -> Result<RouteSet, Box<dyn Error>> {
    let item = models::item_model();
    let user = models::user_model();
    let offer = models::offer_model();
    let image = models::image_model();
    let model_name = models::model_name_enum();

    let mut routes = RouteSet::new();

    routes.register(RouteSpec::new("root", Method::GET, "/", handlers::root)?)?;

    routes.register(
        RouteSpec::new("get_items", Method::GET, "/items", handlers::get_items)?
            .param(FieldSpec::query("skip", FieldType::Int).with_default(BoundValue::Int(0)))
            .param(FieldSpec::query("limit", FieldType::Int).with_default(BoundValue::Int(10)))
            .param(
                FieldSpec::query("hidden_query", FieldType::Bool)
                    .optional()
                    .hidden_from_docs(),
            ),
    )?;

    routes.register(
        RouteSpec::new(
            "get_item",
            Method::GET,
            "/items/{item_id}",
            handlers::get_item,
        )?
        .param(FieldSpec::path("item_id", FieldType::Int).constrained(Constraint::Ge(1.0)))
        .param(FieldSpec::query("needy", FieldType::Str))
        .param(
            FieldSpec::query("q", FieldType::Str)
                .optional()
                .constrained(Constraint::MaxLength(5))
                .constrained(Constraint::Pattern(Pattern::new("^[abc]\\w+q$")?)),
        )
        .param(FieldSpec::query("short", FieldType::Bool).with_default(BoundValue::Bool(false))),
    )?;

    routes.register(
        RouteSpec::new("create_item", Method::POST, "/items", handlers::create_item)?
            .body_field(FieldSpec::body("item", FieldType::Model(Arc::clone(&item)))),
    )?;

    routes.register(
        RouteSpec::new(
            "get_user_item",
            Method::GET,
            "/users/{user_id}/items/{item_id}",
            handlers::get_user_item,
        )?
        .param(FieldSpec::path("user_id", FieldType::Int).constrained(Constraint::Le(3.0)))
        .param(
            FieldSpec::path("item_id", FieldType::Int)
                .constrained(Constraint::Gt(0.0))
                .constrained(Constraint::Le(5.0)),
        )
        .param(FieldSpec::query("q", FieldType::Str))
        .param(FieldSpec::query("short", FieldType::Bool).with_default(BoundValue::Bool(false))),
    )?;

    // the static route must come before its parameterized sibling
    routes.register(RouteSpec::new(
        "get_own_user",
        Method::GET,
        "/users/me",
        handlers::get_own_user,
    )?)?;

    routes.register(
        RouteSpec::new(
            "get_user",
            Method::GET,
            "/users/{user_id}",
            handlers::get_user,
        )?
        .param(FieldSpec::path("user_id", FieldType::Str))
        .param(
            FieldSpec::query("q", FieldType::List(Box::new(FieldType::Str)))
                .aliased("item-query")
                .with_default(BoundValue::List(vec![
                    BoundValue::Str("foo".to_string()),
                    BoundValue::Str("bar".to_string()),
                    BoundValue::Str("zoo".to_string()),
                ]))
                .deprecated(),
        ),
    )?;

    routes.register(
        RouteSpec::new(
            "get_model",
            Method::GET,
            "/models/{model_name}",
            handlers::get_model,
        )?
        .param(FieldSpec::path(
            "model_name",
            FieldType::Enum(model_name),
        )),
    )?;

    routes.register(
        RouteSpec::new(
            "read_file",
            Method::GET,
            "/files/{file_path:path}",
            handlers::read_file,
        )?
        .param(FieldSpec::path("file_path", FieldType::Str)),
    )?;

    // shadowed by the greedy route above: every path both could match
    // resolves there; kept registered for parity with the documented table
    routes.register(
        RouteSpec::new(
            "read_file_2",
            Method::GET,
            "/files/{file_path}",
            handlers::read_file_2,
        )?
        .param(FieldSpec::path("file_path", FieldType::Str)),
    )?;

    routes.register(
        RouteSpec::new(
            "update_item",
            Method::PUT,
            "/items/{item_id}",
            handlers::update_item,
        )?
        .param(
            FieldSpec::path("item_id", FieldType::Int)
                .constrained(Constraint::Ge(0.0))
                .constrained(Constraint::Le(1000.0)),
        )
        .param(FieldSpec::query("q", FieldType::Str).optional())
        .body_field(FieldSpec::body("item", FieldType::Model(Arc::clone(&item))).embedded()),
    )?;

    routes.register(
        RouteSpec::new(
            "update_item_extended",
            Method::PUT,
            "/itemz/{item_id}",
            handlers::update_item_extended,
        )?
        .param(FieldSpec::path("item_id", FieldType::Int))
        .body_field(FieldSpec::body("item", FieldType::Model(item)))
        .body_field(FieldSpec::body("user", FieldType::Model(user)))
        .body_field(FieldSpec::body("importance", FieldType::Int).constrained(Constraint::Gt(0.0))),
    )?;

    routes.register(
        RouteSpec::new(
            "create_offer",
            Method::POST,
            "/offers",
            handlers::create_offer,
        )?
        .body_field(FieldSpec::body("offer", FieldType::Model(offer))),
    )?;

    routes.register(
        RouteSpec::new(
            "create_multiple_images",
            Method::POST,
            "/images/multiple",
            handlers::create_multiple_images,
        )?
        .body_field(FieldSpec::body(
            "images",
            FieldType::List(Box::new(FieldType::Model(image))),
        )),
    )?;

    routes.register(
        RouteSpec::new(
            "create_index_weights",
            Method::POST,
            "/index-weights",
            handlers::create_index_weights,
        )?
        .body_field(FieldSpec::body(
            "weights",
            FieldType::Map(Box::new(FieldType::Int), Box::new(FieldType::Float)),
        )),
    )?;

    Ok(routes)
}
