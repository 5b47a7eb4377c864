//! Demonstration HTTP service built around a typed request-binding core
//!
//! The core turns a raw request (method, path, query string, buffered JSON
//! body) into a strongly typed handler invocation, or into a structured
//! rejection listing every field-level failure at once:
//!
//! - [`schema`] - declarative field/model specs and the typed value tree
//! - [`validate`] - pure constraint evaluation and the failure vocabulary
//! - [`binding`] - extraction, coercion, and failure aggregation
//! - [`routing`] - path templates and first-registered-match resolution
//! - [`dispatch`] - resolve, bind, invoke
//!
//! [`app`] registers the demonstration endpoints; the remaining modules are
//! the transport shell serving them over HTTP/1.1.

pub mod app;
pub mod binding;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod schema;
pub mod server;
pub mod validate;
