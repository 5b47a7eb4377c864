//! Model specifications for the demo endpoints

use std::sync::Arc;

use crate::schema::{BoundValue, EnumSpec, FieldSpec, FieldType, ModelSpec};
use crate::validate::Constraint;

pub fn model_name_enum() -> Arc<EnumSpec> {
    EnumSpec::new("ModelName", &["alexnet", "resnet", "lenet"])
}

pub fn image_model() -> Arc<ModelSpec> {
    Arc::new(ModelSpec::new(
        "Image",
        vec![
            FieldSpec::body("url", FieldType::Url),
            FieldSpec::body("name", FieldType::Str),
        ],
    ))
}

pub fn item_model() -> Arc<ModelSpec> {
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

pub fn offer_model() -> Arc<ModelSpec> {
    Arc::new(ModelSpec::new(
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
    ))
}

pub fn user_model() -> Arc<ModelSpec> {
    Arc::new(ModelSpec::new(
        "User",
        vec![
            FieldSpec::body("username", FieldType::Str),
            FieldSpec::body("full_name", FieldType::Str).optional(),
        ],
    ))
}
