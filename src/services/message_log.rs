//! Message Log Store Adapter.
//!
//! Wraps the key-value collaborator with the read-modify-write append
//! pattern used for rooms and direct messages. The log stored under a key
//! is always a JSON array; a missing key is an empty log, never an error.
//!
//! Failure policy: reads fail open (absent key, unparseable value or an
//! unreachable store all degrade to an empty list, keeping the chat UI
//! functional), writes fail closed and surface the storage error.
//!
//! The append is not atomic against the collaborator: two concurrent
//! appends to the same key can race and one can be lost (last-writer-wins
//! on the full array). Accepted for a low-stakes chat log.

use crate::api::models::{DirectMessage, RoomMessage};
use crate::core::error::{GatewayError, Result};
use crate::services::kv::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Well-known key holding the room identifier index.
const ROOMS_INDEX_KEY: &str = "rooms:index";

/// Append/read access to the per-conversation message logs.
#[derive(Clone)]
pub struct MessageLog {
    kv: Arc<dyn KeyValueStore>,
}

fn room_key(room_id: &str) -> String {
    format!("room:{}:messages", room_id)
}

/// Conversation identifier for a participant pair: the lexicographically
/// sorted pair joined by `:`, so either participant resolves to the same
/// storage key.
fn conversation_id(a: &str, b: &str) -> String {
    let mut pair = [a, b];
    pair.sort_unstable();
    pair.join(":")
}

fn dm_key(a: &str, b: &str) -> String {
    format!("dm:{}", conversation_id(a, b))
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl MessageLog {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Whether a real key-value store is configured.
    pub fn available(&self) -> bool {
        self.kv.available()
    }

    /// Append a message to a room log.
    ///
    /// Fails with a validation error when `user_id` or `content` is empty,
    /// and with a storage error when the collaborator is unreachable.
    pub async fn append_room_message(
        &self,
        room_id: &str,
        user_id: &str,
        username: &str,
        content: &str,
    ) -> Result<RoomMessage> {
        if user_id.is_empty() || content.is_empty() {
            return Err(GatewayError::Validation(
                "userId and content required".to_string(),
            ));
        }

        let message = RoomMessage {
            message_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            content: content.to_string(),
            timestamp: now_iso8601(),
        };

        self.append(&room_key(room_id), message.clone()).await?;
        Ok(message)
    }

    /// Messages of a room, oldest first. Fail-open: `[]` when the key is
    /// absent, the value unparseable, or the store unreachable.
    pub async fn room_messages(&self, room_id: &str) -> Vec<RoomMessage> {
        self.read_log(&room_key(room_id)).await
    }

    /// Append a direct message; the storage key is derived from the sorted
    /// participant pair, regardless of who is the sender.
    pub async fn append_direct_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        sender_name: &str,
        content: &str,
    ) -> Result<DirectMessage> {
        if sender_id.is_empty() || content.is_empty() {
            return Err(GatewayError::Validation(
                "senderId and content required".to_string(),
            ));
        }

        let message = DirectMessage {
            message_id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            content: content.to_string(),
            timestamp: now_iso8601(),
        };

        self.append(&dm_key(sender_id, recipient_id), message.clone())
            .await?;
        Ok(message)
    }

    /// Conversation log between two participants, oldest first. Fail-open.
    pub async fn direct_messages(&self, sender_id: &str, recipient_id: &str) -> Vec<DirectMessage> {
        self.read_log(&dm_key(sender_id, recipient_id)).await
    }

    /// Known room identifiers from the index key, defaulting to `[]`.
    pub async fn room_index(&self) -> Vec<String> {
        self.read_log(ROOMS_INDEX_KEY).await
    }

    /// Read-modify-write append under `key`. Part of the write path, so a
    /// failing read is surfaced instead of treated as empty.
    async fn append<T: Serialize + DeserializeOwned>(&self, key: &str, entry: T) -> Result<()> {
        let existing = self.kv.get(key).await?;

        let mut log: Vec<T> = match existing {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        };
        log.push(entry);

        let serialized = serde_json::to_string(&log)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        self.kv.put(key, serialized).await
    }

    async fn read_log<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.kv.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(log) => log,
                Err(e) => {
                    tracing::warn!("Unparseable log under {}: {}; returning empty list", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    "Key-value store unavailable reading {}: {}; returning empty list",
                    key,
                    e
                );
                Vec::new()
            }
        }
    }
}
