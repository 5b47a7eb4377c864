//! Routing module
//!
//! Provides route resolution for the request pipeline:
//! - Path template parsing (literal, single-segment, greedy segments)
//! - Ordered route registration with startup invariant checks
//! - First-registered-match resolution with a method-not-allowed refinement

mod matcher;
mod template;

pub use matcher::{Handler, RegistryError, Resolution, RouteSet, RouteSpec};
pub use template::{PathCaptures, PathTemplate, Segment, TemplateError};
