//! Router classification tests.
//!
//! Exercises the route table end to end through `tower::ServiceExt::oneshot`
//! with the in-process key-value store, without any network upstreams.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chat_gateway::{build_router, AppState, GatewayConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Gateway with the in-process key-value store and no other bindings.
fn test_app() -> Router {
    let mut config = GatewayConfig::default();
    config.bindings.kv_endpoint = Some("memory".to_string());
    build_router(Arc::new(AppState::from_config(
        config,
        reqwest::Client::new(),
    )))
}

/// Gateway with no bindings configured at all.
fn bare_app() -> Router {
    build_router(Arc::new(AppState::from_config(
        GatewayConfig::default(),
        reqwest::Client::new(),
    )))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_model() {
    let response = test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model"], "@cf/meta/llama-3.3-70b-instruct-fp8-fast");
}

#[tokio::test]
async fn test_debug_bindings_reflects_configuration() {
    let response = test_app().oneshot(get("/debug/bindings")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["kv"], true);
    assert_eq!(json["inference"], false);
    assert_eq!(json["blobs"], false);
    assert_eq!(json["static_site"], false);
}

#[tokio::test]
async fn test_chat_rejects_non_post() {
    let response = test_app().oneshot(get("/api/chat")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_bytes(response).await, b"Method not allowed");
}

#[tokio::test]
async fn test_chat_without_inference_binding_is_json_500() {
    let request = post_json("/api/chat", json!({"messages": [{"role": "user", "content": "hi"}]}));
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to process request");
}

#[tokio::test]
async fn test_chat_with_invalid_json_body_is_json_500() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to process request");
}

#[tokio::test]
async fn test_list_rooms_defaults_to_empty() {
    let response = test_app().oneshot(get("/api/rooms")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_list_rooms_rejects_other_methods() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/rooms")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_bytes(response).await, b"Method not allowed");
}

#[tokio::test]
async fn test_post_then_get_room_messages() {
    let app = test_app();

    let request = post_json(
        "/api/rooms/lobby/post",
        json!({"userId": "u1", "username": "ada", "content": "hello"}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ack = body_json(response).await;
    assert_eq!(ack["success"], true);
    let message_id = ack["messageId"].as_str().unwrap().to_string();

    let response = app.oneshot(get("/api/rooms/lobby")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = body_json(response).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["messageId"], message_id.as_str());
    assert_eq!(messages[0]["userId"], "u1");
    assert_eq!(messages[0]["content"], "hello");
}

#[tokio::test]
async fn test_post_room_message_validates_fields() {
    let app = test_app();

    // Missing userId
    let request = post_json(
        "/api/rooms/lobby/post",
        json!({"username": "ada", "content": "hello"}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "userId and content required"
    );

    // Empty content
    let request = post_json(
        "/api/rooms/lobby/post",
        json!({"userId": "u1", "username": "ada", "content": ""}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was written
    let response = app.oneshot(get("/api/rooms/lobby")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_room_post_rejects_get() {
    let response = test_app()
        .oneshot(get("/api/rooms/lobby/post"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_room_get_with_other_method_is_plain_404() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/rooms/lobby")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"Not found");
}

#[tokio::test]
async fn test_empty_room_reads_as_empty_list() {
    let response = test_app().oneshot(get("/api/rooms/ghost-town")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_dm_roundtrip_is_commutative() {
    let app = test_app();

    let request = post_json(
        "/api/dm/bob",
        json!({"senderId": "alice", "senderName": "Alice", "content": "hi bob"}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // Reply goes through the mirrored URL and lands in the same conversation
    let request = post_json(
        "/api/dm/alice",
        json!({"senderId": "bob", "senderName": "Bob", "content": "hi alice"}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/dm/bob?senderId=alice"))
        .await
        .unwrap();
    let from_alice = body_json(response).await;
    assert_eq!(from_alice.as_array().unwrap().len(), 2);
    assert_eq!(from_alice[0]["content"], "hi bob");
    assert_eq!(from_alice[1]["content"], "hi alice");

    let response = app
        .oneshot(get("/api/dm/alice?senderId=bob"))
        .await
        .unwrap();
    let from_bob = body_json(response).await;
    assert_eq!(from_alice, from_bob);
}

#[tokio::test]
async fn test_dm_get_requires_sender_id() {
    let response = test_app().oneshot(get("/api/dm/bob")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "senderId query param required"
    );
}

#[tokio::test]
async fn test_dm_post_validates_sender_and_content() {
    let request = post_json("/api/dm/bob", json!({"senderName": "Alice", "content": "hi"}));
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "senderId and content required"
    );
}

#[tokio::test]
async fn test_dm_without_recipient_is_400() {
    let response = test_app().oneshot(get("/api/dm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_app().oneshot(get("/api/dm/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dm_rejects_unsupported_method() {
    let request = Request::builder()
        .method("PUT")
        .uri("/api/dm/bob")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_api_path_is_plain_404() {
    let response = test_app().oneshot(get("/api/bogus")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // Plain text, no JSON error object
    assert_eq!(body_bytes(response).await, b"Not found");
}

#[tokio::test]
async fn test_non_api_path_without_static_binding_is_404() {
    let response = test_app().oneshot(get("/about")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_logo_alias_redirects() {
    let response = test_app()
        .oneshot(get("/XAOSTECH_LOGO.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/api/assets/XAOSTECH_LOGO.png"
    );
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    for uri in ["/health", "/api/bogus", "/api/rooms"] {
        let response = test_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff",
            "missing security header on {}",
            uri
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    }
}

#[tokio::test]
async fn test_missing_kv_binding_fails_open_on_reads() {
    let app = bare_app();

    let response = app.clone().oneshot(get("/api/rooms/lobby")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = app.oneshot(get("/api/rooms")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_missing_kv_binding_fails_closed_on_writes() {
    let request = post_json(
        "/api/rooms/lobby/post",
        json!({"userId": "u1", "username": "ada", "content": "hello"}),
    );
    let response = bare_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Failed to post message");
}
