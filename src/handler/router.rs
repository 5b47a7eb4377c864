//! Request handling entry point
//!
//! Per-request pipeline: preflight answer, body-size guard, body
//! collection, dispatch through the typed binding core, and serialization
//! of the outcome, with an access-log entry recording the result.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Version};

use crate::config::AppState;
use crate::dispatch::{dispatch, Outcome, RawRequest};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    // the request is consumed when the body is collected, so take what the
    // pipeline and the access log need up front
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version());
    let referer = header_value(req.headers(), "referer");
    let user_agent = header_value(req.headers(), "user-agent");

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let response = build_response(req, &state, &method, &path, query.as_deref()).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.http_version = http_version.to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response_body_bytes(&response);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn build_response(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    // 1. OPTIONS preflight is answered at the transport layer
    if *method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 2. Check declared body size before buffering anything
    if let Some(response) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return response;
    }

    // 3. Buffer the body; the core binds against fully received bytes
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response("Failed to read request body");
        }
    };

    // 4. Resolve, bind, invoke
    let outcome = dispatch(
        &state.routes,
        &RawRequest {
            method,
            path,
            query,
            body: &body,
        },
    );

    match outcome {
        Outcome::Completed(value) => http::build_json_response(StatusCode::OK, &value),
        Outcome::Invalid(errors) => http::build_422_response(&errors.to_json()),
        Outcome::MethodNotAllowed => http::build_405_response(),
        Outcome::NotFound => http::build_404_response(),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Body size as declared by the response itself
fn response_body_bytes(response: &Response<Full<Bytes>>) -> usize {
    header_value(response.headers(), "content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
