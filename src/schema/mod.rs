//! Schema model module
//!
//! Declarative descriptions of typed, constrained input values
//! (`FieldSpec`, `ModelSpec`, `EnumSpec`), the typed value tree they
//! produce (`BoundValue`), and structured JSON decoding against them.

mod decode;
mod spec;
mod value;

pub use spec::{EnumSpec, FieldSpec, FieldType, ModelSpec};
pub use value::BoundValue;

pub(crate) use decode::decode_field;
