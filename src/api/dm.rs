//! Direct-message handlers.
//!
//! A conversation is keyed by the sorted participant pair, so
//! `POST /api/dm/{recipientId}` from either side lands in the same log.
//! `GET /api/dm/{recipientId}` needs the caller's own id as a `senderId`
//! query parameter since it is not recoverable from the storage key alone.

use crate::api::models::{DirectMessage, PostAck, PostDirectMessageRequest};
use crate::api::router::AppState;
use crate::core::error::{GatewayError, Result};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessageQuery {
    #[serde(default)]
    pub sender_id: Option<String>,
}

/// Append a message to the conversation with `recipient_id`.
pub async fn post_direct_message(
    State(state): State<Arc<AppState>>,
    Path(recipient_id): Path<String>,
    body: Bytes,
) -> Result<Json<PostAck>> {
    let request: PostDirectMessageRequest = serde_json::from_slice(&body).unwrap_or_default();

    let message = state
        .message_log
        .append_direct_message(
            &request.sender_id,
            &recipient_id,
            &request.sender_name,
            &request.content,
        )
        .await?;

    Ok(Json(PostAck {
        message_id: message.message_id,
        success: true,
    }))
}

/// Conversation log, oldest first. The caller's own id arrives as the
/// `senderId` query parameter.
pub async fn get_direct_messages(
    State(state): State<Arc<AppState>>,
    Path(recipient_id): Path<String>,
    Query(query): Query<DirectMessageQuery>,
) -> Result<Json<Vec<DirectMessage>>> {
    let sender_id = query
        .sender_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::Validation("senderId query param required".to_string()))?;

    Ok(Json(
        state
            .message_log
            .direct_messages(&sender_id, &recipient_id)
            .await,
    ))
}

/// `/api/dm` with no recipient segment.
pub async fn missing_recipient() -> GatewayError {
    GatewayError::Validation("Recipient ID required".to_string())
}
