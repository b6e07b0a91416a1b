//! Request Router.
//!
//! Classifies every inbound request in a fixed priority order: diagnostic
//! endpoints, the AI chat endpoint, the social-chat API, the named asset
//! path, the configured upstream-origin prefix table, the static site, and
//! a plain-text 404 terminal. Cross-cutting response transformation
//! (security headers, request logging, CORS, tracing) is layered on top.

use crate::api::models::{BindingsResponse, HealthResponse};
use crate::api::{assets, chat, dm, proxy, rooms};
use crate::core::config::GatewayConfig;
use crate::core::error::{GatewayError, Result};
use crate::core::middleware::{request_logging_middleware, security_headers_middleware};
use crate::services::blobs::{BlobStore, DirBlobStore, NullBlobStore};
use crate::services::inference::{HttpInferenceClient, InferenceClient, NullInferenceClient};
use crate::services::kv::{
    HttpKeyValueStore, KeyValueStore, MemoryKeyValueStore, NullKeyValueStore,
};
use crate::services::message_log::MessageLog;
use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    response::Response,
    routing::{any, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared, request-scoped-immutable application state.
///
/// The router owns no persistent state; the only shared mutable resource
/// is the external key-value collaborator behind [`MessageLog`].
pub struct AppState {
    pub config: GatewayConfig,
    pub message_log: MessageLog,
    pub inference: Arc<dyn InferenceClient>,
    pub blobs: Arc<dyn BlobStore>,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Construct collaborators from the configured bindings.
    ///
    /// Absent bindings get null implementations; the special key-value
    /// endpoint `memory` selects the in-process store for local runs.
    pub fn from_config(config: GatewayConfig, http_client: reqwest::Client) -> Self {
        let kv: Arc<dyn KeyValueStore> = match config.bindings.kv_endpoint.as_deref() {
            Some("memory") => Arc::new(MemoryKeyValueStore::new()),
            Some(endpoint) => Arc::new(HttpKeyValueStore::new(http_client.clone(), endpoint)),
            None => Arc::new(NullKeyValueStore),
        };

        let inference: Arc<dyn InferenceClient> = match config.bindings.inference_endpoint.as_deref()
        {
            Some(endpoint) => Arc::new(HttpInferenceClient::new(http_client.clone(), endpoint)),
            None => Arc::new(NullInferenceClient),
        };

        let blobs: Arc<dyn BlobStore> = match &config.bindings.blob_dir {
            Some(dir) => Arc::new(DirBlobStore::new(dir.clone())),
            None => Arc::new(NullBlobStore),
        };

        Self {
            message_log: MessageLog::new(kv),
            inference,
            blobs,
            http_client,
            config,
        }
    }

    /// Log collaborator availability once at startup (no secrets).
    pub fn log_binding_availability(&self) {
        tracing::debug!(
            "bindings availability kv={} inference={} blobs={} static_site={}",
            self.message_log.available(),
            self.inference.available(),
            self.blobs.available(),
            self.config.bindings.static_origin.is_some()
        );
    }
}

/// Build the gateway router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let logo_path = format!("/api/assets/{}", state.config.assets.logo_name);
    let legacy_path = format!("/{}", state.config.assets.logo_name);

    Router::new()
        // Diagnostic endpoints, answered locally
        .route("/health", get(health))
        .route("/debug/bindings", get(debug_bindings))
        // AI chat
        .route(
            "/api/chat",
            post(chat::stream_chat).fallback(method_not_allowed),
        )
        // Social rooms
        .route("/api/rooms", get(rooms::list_rooms).fallback(method_not_allowed))
        .route(
            "/api/rooms/",
            get(rooms::list_rooms).fallback(method_not_allowed),
        )
        .route(
            "/api/rooms/:room_id",
            get(rooms::get_room_messages).fallback(not_found),
        )
        .route(
            "/api/rooms/:room_id/post",
            post(rooms::post_room_message).fallback(method_not_allowed),
        )
        // Direct messages
        .route("/api/dm", any(dm::missing_recipient))
        .route("/api/dm/", any(dm::missing_recipient))
        .route(
            "/api/dm/:recipient_id",
            get(dm::get_direct_messages)
                .post(dm::post_direct_message)
                .fallback(method_not_allowed),
        )
        // Named asset and its legacy alias
        .route(&logo_path, get(assets::get_logo))
        .route(&legacy_path, get(assets::legacy_logo_redirect))
        // Upstream-origin prefixes, static site, then 404
        .fallback(dispatch)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health` — liveness plus the configured model id.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.config.model.clone(),
    })
}

/// `GET /debug/bindings` — which collaborators are configured.
async fn debug_bindings(State(state): State<Arc<AppState>>) -> Json<BindingsResponse> {
    Json(BindingsResponse {
        kv: state.message_log.available(),
        inference: state.inference.available(),
        blobs: state.blobs.available(),
        static_site: state.config.bindings.static_origin.is_some(),
    })
}

async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

async fn not_found() -> GatewayError {
    GatewayError::NotFound
}

/// Terminal dispatcher for everything the route table above did not match.
///
/// Priority: configured upstream prefixes (prefix stripped from the
/// forwarded path), then the static-site collaborator for non-API paths,
/// then plain 404.
async fn dispatch(State(state): State<Arc<AppState>>, request: Request) -> Result<Response> {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(|q| q.to_string());

    let matched = state
        .config
        .match_route(&path)
        .map(|(target, remainder)| (target.origin.clone(), remainder));

    if let Some((origin, remainder)) = matched {
        let (parts, body) = request.into_parts();
        let body_bytes = read_body(&parts.method, body).await?;
        return proxy::forward(
            &state.http_client,
            &parts.method,
            &parts.headers,
            body_bytes,
            &origin,
            &remainder,
            query.as_deref(),
        )
        .await;
    }

    if !path.starts_with("/api/") {
        if let Some(origin) = state.config.bindings.static_origin.clone() {
            let (parts, body) = request.into_parts();
            let body_bytes = read_body(&parts.method, body).await?;
            return proxy::forward(
                &state.http_client,
                &parts.method,
                &parts.headers,
                body_bytes,
                &origin,
                &path,
                query.as_deref(),
            )
            .await;
        }
    }

    Err(GatewayError::NotFound)
}

/// Buffer the request body for non-GET/HEAD methods. Streaming request
/// bodies upstream is not supported.
async fn read_body(method: &Method, body: Body) -> Result<Option<bytes::Bytes>> {
    if method == Method::GET || method == Method::HEAD {
        return Ok(None);
    }

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GatewayError::Proxy(e.to_string()))?;
    Ok(Some(bytes))
}
