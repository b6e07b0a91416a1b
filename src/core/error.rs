//! Error types and handling for the chat gateway.
//!
//! This module provides a unified error type [`GatewayError`] that wraps the
//! failure modes of the external collaborators and implements proper HTTP
//! response conversion.
//!
//! Unmatched routes and wrong methods keep the plain-text bodies the public
//! surface has always served; everything else responds with a small JSON
//! object carrying a single `error` field. Collaborator errors are always
//! wrapped before they reach a response, so internal details never leak.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the gateway.
///
/// All errors surfaced by handlers should be converted to this type for
/// consistent handling.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Client supplied invalid or incomplete data (missing field, empty id)
    #[error("{0}")]
    Validation(String),

    /// Path exists but the method is not supported
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No route matched, or a required path segment is missing
    #[error("Not found")]
    NotFound,

    /// The inference collaborator failed or the chat body was not valid JSON
    #[error("inference failure: {0}")]
    Inference(String),

    /// The reverse-proxy upstream fetch failed (DNS, refused, timeout)
    #[error("proxy failure: {0}")]
    Proxy(String),

    /// The key-value collaborator was unreachable on the write path.
    /// Read paths never produce this: they degrade to an empty list.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            // Plain-text terminals, matching the historical route-table fallthrough
            GatewayError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            GatewayError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),

            GatewayError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            GatewayError::Inference(msg) => {
                tracing::error!("Error processing chat request: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to process request" })),
                )
                    .into_response()
            }
            GatewayError::Proxy(msg) => {
                tracing::error!("[route-proxy] fetch error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Proxy failed" })),
                )
                    .into_response()
            }
            GatewayError::Storage(msg) => {
                tracing::error!("Storage write failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to post message" })),
                )
                    .into_response()
            }
        }
    }
}

/// Convenience type alias for Results using [`GatewayError`].
pub type Result<T> = std::result::Result<T, GatewayError>;
