//! HTTP middleware for cross-cutting response transformation.
//!
//! Every response leaving the router passes through a header-augmentation
//! step that injects a fixed set of security headers without altering the
//! status or body. A request-logging middleware records method, path,
//! status and duration for the API surface.

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Fixed security headers appended to every outgoing response.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Middleware that injects the fixed security header set.
///
/// Existing header values are overwritten so upstreams cannot weaken the
/// gateway's policy on proxied responses.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

/// Middleware for logging requests passing through the gateway.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    tracing::info!(
        "{} {} - status={} duration={:.3}s",
        method,
        path,
        status,
        duration
    );

    response
}
