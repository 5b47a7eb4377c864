//! Route registration and matching
//!
//! Routes are registered once at startup, in a fixed order, and the set is
//! immutable afterwards. Resolution walks the registered order and the
//! first structurally matching route wins; an earlier greedy template
//! permanently shadows any later overlapping template. That precedence is
//! load-bearing and must not be replaced by specificity sorting.

use std::fmt;
use std::sync::Arc;

use hyper::Method;

use crate::binding::BoundRequest;
use crate::schema::{FieldSpec, ModelSpec};
use crate::validate::Location;

use super::template::{PathCaptures, PathTemplate, TemplateError};

/// Handler invoked with the bound, validated arguments of one request
pub type Handler = Arc<dyn Fn(&BoundRequest<'_>) -> serde_json::Value + Send + Sync>;

/// One registered method + path template + parameter declaration unit
pub struct RouteSpec {
    pub name: &'static str,
    pub method: Method,
    pub template: PathTemplate,
    /// Path and query parameter declarations, in declared order
    pub params: Vec<FieldSpec>,
    /// The route's implicit body object, when it accepts one
    pub body: Option<ModelSpec>,
    pub handler: Handler,
}

impl RouteSpec {
    pub fn new(
        name: &'static str,
        method: Method,
        template: &str,
        handler: impl Fn(&BoundRequest<'_>) -> serde_json::Value + Send + Sync + 'static,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            name,
            method,
            template: PathTemplate::parse(template)?,
            params: Vec::new(),
            body: None,
            handler: Arc::new(handler),
        })
    }

    /// Declare a path or query parameter
    pub fn param(mut self, spec: FieldSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Declare a field of the route's body object
    pub fn body_field(mut self, spec: FieldSpec) -> Self {
        self.body
            .get_or_insert_with(|| ModelSpec::new("body", Vec::new()))
            .fields
            .push(spec);
        self
    }
}

/// Registration failure, reported at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Template(TemplateError),
    /// A template parameter with no matching path field declaration
    UnboundTemplateParam { route: &'static str, param: String },
    /// A path field declaration with no matching template parameter
    UnknownPathParam { route: &'static str, param: String },
    /// A parameter name declared more than once
    DuplicateParam { route: &'static str, param: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(e) => write!(f, "{e}"),
            Self::UnboundTemplateParam { route, param } => write!(
                f,
                "route \"{route}\": template parameter \"{param}\" has no path field declaration"
            ),
            Self::UnknownPathParam { route, param } => write!(
                f,
                "route \"{route}\": path field \"{param}\" does not appear in the template"
            ),
            Self::DuplicateParam { route, param } => {
                write!(f, "route \"{route}\": parameter \"{param}\" declared twice")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<TemplateError> for RegistryError {
    fn from(e: TemplateError) -> Self {
        Self::Template(e)
    }
}

/// Result of resolving a method + path against the registered set
pub enum Resolution<'a> {
    Matched {
        route: &'a RouteSpec,
        captures: PathCaptures,
    },
    /// Some template matched the path shape, but under a different method
    MethodNotAllowed,
    NotFound,
}

/// The registered route table, immutable after startup
#[derive(Default)]
pub struct RouteSet {
    routes: Vec<RouteSpec>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, enforcing the template/path-field invariants
    pub fn register(&mut self, route: RouteSpec) -> Result<(), RegistryError> {
        let template_params: Vec<&str> = route.template.param_names().collect();
        for (index, param) in template_params.iter().enumerate() {
            if template_params[..index].contains(param) {
                return Err(RegistryError::DuplicateParam {
                    route: route.name,
                    param: (*param).to_string(),
                });
            }
            let declared = route
                .params
                .iter()
                .filter(|f| f.source == Location::Path && f.name == *param)
                .count();
            match declared {
                1 => {}
                0 => {
                    return Err(RegistryError::UnboundTemplateParam {
                        route: route.name,
                        param: (*param).to_string(),
                    })
                }
                _ => {
                    return Err(RegistryError::DuplicateParam {
                        route: route.name,
                        param: (*param).to_string(),
                    })
                }
            }
        }
        for field in route.params.iter().filter(|f| f.source == Location::Path) {
            if !template_params.contains(&field.name.as_str()) {
                return Err(RegistryError::UnknownPathParam {
                    route: route.name,
                    param: field.name.clone(),
                });
            }
        }
        self.routes.push(route);
        Ok(())
    }

    /// Find the first structurally matching route for a method and path
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let mut path_matched = false;
        for route in &self.routes {
            if let Some(captures) = route.template.match_path(path) {
                if route.method == *method {
                    return Resolution::Matched { route, captures };
                }
                path_matched = true;
            }
        }
        if path_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }

    /// Registered routes in registration order, for introspection
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Describe the registered table for documentation generation
    pub fn describe(&self) -> serde_json::Value {
        let routes: Vec<serde_json::Value> = self
            .routes
            .iter()
            .map(|route| {
                let parameters: Vec<serde_json::Value> = route
                    .params
                    .iter()
                    .filter(|p| p.include_in_docs)
                    .map(describe_field)
                    .collect();
                let body = route.body.as_ref().map(|model| {
                    model
                        .fields
                        .iter()
                        .filter(|f| f.include_in_docs)
                        .map(describe_field)
                        .collect::<Vec<_>>()
                });
                serde_json::json!({
                    "name": route.name,
                    "method": route.method.as_str(),
                    "path": route.template.raw(),
                    "parameters": parameters,
                    "body": body,
                })
            })
            .collect();
        serde_json::Value::Array(routes)
    }
}

fn describe_field(field: &FieldSpec) -> serde_json::Value {
    serde_json::json!({
        "name": field.lookup_key(),
        "in": field.source.as_str(),
        "type": field.ty.name(),
        "required": field.required(),
        "deprecated": field.deprecated,
    })
}
