//! Social chat room handlers.
//!
//! `GET /api/rooms` lists the known room identifiers,
//! `GET /api/rooms/{roomId}` returns a room's message log and
//! `POST /api/rooms/{roomId}/post` appends to it. Reads fail open to an
//! empty list so a temporarily unavailable store never breaks the page.

use crate::api::models::{PostAck, PostRoomMessageRequest, RoomMessage};
use crate::api::router::AppState;
use crate::core::error::Result;
use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

/// Known room identifiers, `[]` when none.
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.message_log.room_index().await)
}

/// Message log of a room, oldest first.
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Json<Vec<RoomMessage>> {
    Json(state.message_log.room_messages(&room_id).await)
}

/// `POST /api/rooms/{roomId}/post` — append a message to a room.
///
/// Malformed JSON is treated as an empty body, so it fails the same
/// `userId`/`content` validation as missing fields.
pub async fn post_room_message(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> Result<Json<PostAck>> {
    let request: PostRoomMessageRequest = serde_json::from_slice(&body).unwrap_or_default();

    let message = state
        .message_log
        .append_room_message(&room_id, &request.user_id, &request.username, &request.content)
        .await?;

    Ok(Json(PostAck {
        message_id: message.message_id,
        success: true,
    }))
}
