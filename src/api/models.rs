//! Request and response models for the gateway API.
//!
//! Field names follow the wire format the chat frontend already speaks:
//! camelCase for the social-chat payloads, lowercase role tags for the AI
//! turn sequence.

use serde::{Deserialize, Serialize};

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of an AI conversation. Immutable once sent to the inference
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

/// A message posted to a room. Append-only, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessage {
    pub message_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub timestamp: String,
}

/// A direct message between two participants. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub message_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub timestamp: String,
}

/// Body of `POST /api/rooms/{roomId}/post`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRoomMessageRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /api/dm/{recipientId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDirectMessageRequest {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub content: String,
}

/// Acknowledgement returned by the post operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAck {
    pub message_id: String,
    pub success: bool,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// Response of `GET /debug/bindings`: which collaborators are configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingsResponse {
    pub kv: bool,
    pub inference: bool,
    pub blobs: bool,
    pub static_site: bool,
}
