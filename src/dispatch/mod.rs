//! Dispatch module
//!
//! Ties route resolution to parameter binding and handler invocation.
//! Resolution failures short-circuit before any binding work; binding
//! failures surface as one aggregated `ValidationError`. The core is
//! stateless and performs no I/O.

use hyper::Method;

use crate::binding;
use crate::routing::{Resolution, RouteSet};
use crate::validate::ValidationError;

/// The transport-independent view of one incoming request
pub struct RawRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    /// Fully buffered body; empty when the request carried none
    pub body: &'a [u8],
}

/// Terminal result of dispatching one request
pub enum Outcome {
    /// Handler ran with bound, validated arguments
    Completed(serde_json::Value),
    /// One or more declared fields failed binding or validation
    Invalid(ValidationError),
    MethodNotAllowed,
    NotFound,
}

/// Resolve, bind, and invoke
pub fn dispatch(routes: &RouteSet, request: &RawRequest<'_>) -> Outcome {
    match routes.resolve(request.method, request.path) {
        Resolution::NotFound => Outcome::NotFound,
        Resolution::MethodNotAllowed => Outcome::MethodNotAllowed,
        Resolution::Matched { route, captures } => {
            match binding::bind(route, &captures, request.query, request.body) {
                Ok(bound) => Outcome::Completed((route.handler)(&bound)),
                Err(errors) => Outcome::Invalid(errors),
            }
        }
    }
}
