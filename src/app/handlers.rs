//! Handler bodies for the demo endpoints
//!
//! Handlers receive bound, validated arguments and return the JSON payload
//! to serialize; all input checking happened before they run.

use serde_json::{json, Value};

use crate::binding::BoundRequest;

fn fake_items_db() -> Vec<Value> {
    vec![
        json!({"item_name": "Foo"}),
        json!({"item_name": "Bar"}),
        json!({"item_name": "Baz"}),
    ]
}

pub fn root(_req: &BoundRequest<'_>) -> Value {
    json!({"message": "Hello World!"})
}

pub fn get_items(req: &BoundRequest<'_>) -> Value {
    if req.bool_arg("hidden_query") == Some(true) {
        return json!({"secret code": "007"});
    }
    let skip = usize::try_from(req.int_arg("skip").unwrap_or(0)).unwrap_or(0);
    let limit = usize::try_from(req.int_arg("limit").unwrap_or(10)).unwrap_or(0);
    let db = fake_items_db();
    let start = skip.min(db.len());
    let end = skip.saturating_add(limit).min(db.len());
    json!(db[start..end])
}

pub fn get_item(req: &BoundRequest<'_>) -> Value {
    let mut item = json!({
        "item_id": req.int_arg("item_id"),
        "needy": req.str_arg("needy"),
    });
    if let Some(q) = req.str_arg("q") {
        item["q"] = json!(q);
    }
    if req.bool_arg("short") != Some(true) {
        item["description"] = json!("Item description here.");
    }
    item
}

pub fn create_item(req: &BoundRequest<'_>) -> Value {
    req.json_arg("item").unwrap_or(Value::Null)
}

pub fn get_user_item(req: &BoundRequest<'_>) -> Value {
    let mut item = json!({
        "user_id": req.int_arg("user_id"),
        "item_id": req.int_arg("item_id"),
    });
    if let Some(q) = req.str_arg("q") {
        item["q"] = json!(q);
    }
    if req.bool_arg("short") != Some(true) {
        item["description"] = json!("item description hereeee.");
    }
    item
}

pub fn get_own_user(_req: &BoundRequest<'_>) -> Value {
    json!({"user_id": "own user"})
}

pub fn get_user(req: &BoundRequest<'_>) -> Value {
    json!({
        "user_id": req.str_arg("user_id"),
        "q": req.json_arg("q"),
    })
}

pub fn get_model(req: &BoundRequest<'_>) -> Value {
    let model_name = req.str_arg("model_name").unwrap_or_default();
    // one exhaustive match over the closed member set
    let message = match model_name {
        "alexnet" => "Deep Learning FTW!",
        "lenet" => "LeCNN all the images",
        _ => "Have some residuals",
    };
    json!({"model_name": model_name, "message": message})
}

pub fn read_file(req: &BoundRequest<'_>) -> Value {
    json!({"file_path": req.str_arg("file_path")})
}

pub fn read_file_2(req: &BoundRequest<'_>) -> Value {
    json!({"file_path_2": req.str_arg("file_path")})
}

pub fn update_item(req: &BoundRequest<'_>) -> Value {
    let mut results = json!({"item_id": req.int_arg("item_id")});
    if let Some(q) = req.str_arg("q") {
        results["q"] = json!(q);
    }
    if let Some(item) = req.json_arg("item") {
        results["item"] = item;
    }
    results
}

pub fn update_item_extended(req: &BoundRequest<'_>) -> Value {
    json!({
        "item_id": req.int_arg("item_id"),
        "item": req.json_arg("item"),
        "user": req.json_arg("user"),
        "importance": req.int_arg("importance"),
    })
}

pub fn create_offer(req: &BoundRequest<'_>) -> Value {
    req.json_arg("offer").unwrap_or(Value::Null)
}

pub fn create_multiple_images(req: &BoundRequest<'_>) -> Value {
    req.json_arg("images").unwrap_or(Value::Null)
}

pub fn create_index_weights(req: &BoundRequest<'_>) -> Value {
    req.json_arg("weights").unwrap_or(Value::Null)
}
