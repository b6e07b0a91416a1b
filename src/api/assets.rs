//! Named asset serving.
//!
//! The configured logo is served from the binary-object collaborator when
//! present, and proxied from the configured asset origin otherwise. Both
//! paths carry a week-long public cache header. The legacy root alias 302s
//! to the canonical `/api/assets/` path.

use crate::api::router::AppState;
use crate::core::error::{GatewayError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

const ASSET_CACHE_CONTROL: &str = "public, max-age=604800";

/// Serve the configured logo asset.
pub async fn get_logo(State(state): State<Arc<AppState>>) -> Result<Response> {
    let name = &state.config.assets.logo_name;

    match state.blobs.get(name).await {
        Ok(Some(object)) => {
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(CACHE_CONTROL, ASSET_CACHE_CONTROL);
            if let Some(content_type) = &object.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            return builder
                .body(Body::from(object.body))
                .map_err(|e| GatewayError::Proxy(e.to_string()));
        }
        Ok(None) => {
            tracing::debug!("blob binding missing or object not found; proxying to asset origin");
        }
        Err(e) => {
            tracing::warn!("blob store failed for {}: {}; proxying to asset origin", name, e);
        }
    }

    let url = format!(
        "{}/{}",
        state.config.assets.fallback_origin.trim_end_matches('/'),
        name
    );

    let proxied = state
        .http_client
        .get(&url)
        .header(reqwest::header::USER_AGENT, "chat-gateway")
        .send()
        .await
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;

    if !proxied.status().is_success() {
        tracing::error!("proxied asset fetch failed: {}", proxied.status());
        return Ok((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Asset not available" })),
        )
            .into_response());
    }

    let content_type = proxied
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = proxied
        .bytes()
        .await
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CACHE_CONTROL, ASSET_CACHE_CONTROL);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(body))
        .map_err(|e| GatewayError::Proxy(e.to_string()))
}

/// Legacy alias at the site root: 302 to the canonical asset path.
pub async fn legacy_logo_redirect(
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let location = format!("/api/assets/{}", state.config.assets.logo_name);

    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, location)
        .body(Body::empty())
        .map_err(|e| GatewayError::Proxy(e.to_string()))
}
