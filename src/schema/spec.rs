//! Declarative parameter and model specifications
//!
//! Specs are plain immutable records built once at registration time; no
//! runtime mutation, no reflection.

use std::sync::Arc;

use crate::validate::{Constraint, Location};

use super::value::BoundValue;

/// Declared type of a field
#[derive(Debug, Clone)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    /// An http/https URL, kept as its string form after validation
    Url,
    /// Closed set of string literals
    Enum(Arc<EnumSpec>),
    /// Nested structured value
    Model(Arc<ModelSpec>),
    /// Ordered sequence of elements
    List(Box<FieldType>),
    /// Deduplicated collection; element order is unspecified
    Set(Box<FieldType>),
    /// Key/value mapping with typed keys
    Map(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    /// Human-readable type name used in error messages and docs output
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::Url => "url",
            Self::Enum(_) => "enum",
            Self::Model(_) => "object",
            Self::List(_) => "array",
            Self::Set(_) => "set",
            Self::Map(..) => "mapping",
        }
    }
}

/// Closed set of named string constants
#[derive(Debug, Clone)]
pub struct EnumSpec {
    pub name: &'static str,
    pub members: Vec<String>,
}

impl EnumSpec {
    pub fn new(name: &'static str, members: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            members: members.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Named, ordered set of field specs describing a structured value
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ModelSpec {
    pub const fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { name, fields }
    }
}

/// One typed, constrained input value
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub source: Location,
    /// All declared constraints must pass
    pub constraints: Vec<Constraint>,
    /// `None` marks the field required
    pub default: Option<BoundValue>,
    /// Whether an explicit JSON `null` is accepted
    pub nullable: bool,
    /// External lookup name; when set, the internal name is not consulted
    pub alias: Option<String>,
    /// Documentation-only flag, does not affect validation
    pub deprecated: bool,
    /// Documentation-only flag; hidden parameters still bind normally
    pub include_in_docs: bool,
    /// Body fields only: nest the value one level under its own key
    pub embed: bool,
}

impl FieldSpec {
    fn new(name: &str, ty: FieldType, source: Location) -> Self {
        // Enum-typed fields carry their membership constraint from the start
        let constraints = match &ty {
            FieldType::Enum(spec) => vec![Constraint::OneOf(spec.members.clone())],
            _ => Vec::new(),
        };
        Self {
            name: name.to_string(),
            ty,
            source,
            constraints,
            default: None,
            nullable: false,
            alias: None,
            deprecated: false,
            include_in_docs: true,
            embed: false,
        }
    }

    /// Declare a path parameter
    pub fn path(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Location::Path)
    }

    /// Declare a query parameter
    pub fn query(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Location::Query)
    }

    /// Declare a body field (route-level or model member)
    pub fn body(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Location::Body)
    }

    pub fn constrained(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_default(mut self, default: BoundValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Nullable with a `null` default: absent and explicit-null both bind
    /// to `BoundValue::Null`
    pub fn optional(mut self) -> Self {
        self.nullable = true;
        self.default = Some(BoundValue::Null);
        self
    }

    pub fn aliased(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn hidden_from_docs(mut self) -> Self {
        self.include_in_docs = false;
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embed = true;
        self
    }

    /// Required means no declared default
    pub const fn required(&self) -> bool {
        self.default.is_none()
    }

    /// External name used to look the field up in raw input
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
