//! Reverse Proxy Mediator.
//!
//! Rewrites and forwards requests to named upstream origins, preserving
//! method, body and headers except hop-by-hop ones, then relays the
//! upstream status, headers and body back while streaming the body.

use crate::core::error::{GatewayError, Result};
use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Method, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::StreamExt;

/// Request headers that are meaningful only for one connection leg and must
/// not be forwarded verbatim.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "upgrade",
    "keep-alive",
];

/// Response headers describing connection framing, re-established by the
/// gateway's own transport when the body is relayed.
const FRAMING_RESPONSE_HEADERS: &[&str] = &["connection", "transfer-encoding", "keep-alive"];

/// Forward a request to `origin`, appending `path_remainder` and the
/// original query string.
///
/// The request body, if any, has already been read in full; streaming
/// request bodies upstream is not supported. The upstream response body is
/// relayed as a stream without buffering.
pub async fn forward(
    client: &reqwest::Client,
    method: &Method,
    headers: &axum::http::HeaderMap,
    body: Option<Bytes>,
    origin: &str,
    path_remainder: &str,
    query: Option<&str>,
) -> Result<Response> {
    let mut url = format!("{}{}", origin.trim_end_matches('/'), path_remainder);
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }

    let outbound_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;

    let mut request = client.request(outbound_method, &url);

    for (name, value) in headers {
        if HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let Ok(value) = value.to_str() {
            request = request.header(name.as_str(), value);
        }
    }

    if method != Method::GET && method != Method::HEAD {
        if let Some(body) = body {
            request = request.body(body);
        }
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;

    relay_response(upstream)
}

/// Convert an upstream reqwest response into an axum response, streaming
/// the body through untouched.
pub fn relay_response(upstream: reqwest::Response) -> Result<Response> {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;

    let mut builder = Response::builder().status(status);

    if let Some(response_headers) = builder.headers_mut() {
        for (name, value) in upstream.headers() {
            if FRAMING_RESPONSE_HEADERS.contains(&name.as_str()) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                response_headers.append(name, value);
            }
        }
    }

    let stream = upstream
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| GatewayError::Proxy(e.to_string()))
}
