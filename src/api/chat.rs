//! AI Stream Mediator.
//!
//! Forwards a chat turn sequence to the inference collaborator and relays
//! its output to the caller as an incremental byte stream, without
//! buffering the whole response. Failures never produce a partial stream
//! mixed with an error: the request either streams or answers with a small
//! JSON error object.

use crate::api::models::{ChatRequest, ChatTurn, Role};
use crate::api::router::AppState;
use crate::core::error::{GatewayError, Result};
use crate::services::inference::InferenceInput;
use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;

/// `POST /api/chat` — stream an AI response for the supplied conversation.
///
/// The body is parsed manually so that invalid JSON maps to the same 500
/// JSON error as a collaborator failure.
pub async fn stream_chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::Inference(format!("invalid chat body: {}", e)))?;

    let messages = with_system_turn(request.messages, &state.config.system_prompt);

    let generation = state
        .inference
        .run(
            &state.config.model,
            InferenceInput {
                messages,
                max_tokens: state.config.max_tokens,
            },
        )
        .await?;

    let content_type = generation
        .content_type
        .unwrap_or_else(|| "text/event-stream".to_string());

    Response::builder()
        .status(200)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from_stream(generation.stream))
        .map_err(|e| GatewayError::Inference(e.to_string()))
}

/// Insert the fixed system turn at index 0 if the conversation does not
/// already start with one. An empty conversation is left alone.
fn with_system_turn(mut messages: Vec<ChatTurn>, prompt: &str) -> Vec<ChatTurn> {
    if !messages.is_empty() && messages[0].role != Role::System {
        messages.insert(
            0,
            ChatTurn {
                role: Role::System,
                content: prompt.to_string(),
            },
        );
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_turn_prepended_when_missing() {
        let messages = vec![ChatTurn {
            role: Role::User,
            content: "hi".to_string(),
        }];

        let result = with_system_turn(messages, "be kind");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, Role::System);
        assert_eq!(result[0].content, "be kind");
        assert_eq!(result[1].role, Role::User);
    }

    #[test]
    fn test_system_turn_not_duplicated() {
        let messages = vec![
            ChatTurn {
                role: Role::System,
                content: "already here".to_string(),
            },
            ChatTurn {
                role: Role::User,
                content: "hi".to_string(),
            },
        ];

        let result = with_system_turn(messages, "be kind");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "already here");
    }

    #[test]
    fn test_empty_conversation_left_alone() {
        let result = with_system_turn(Vec::new(), "be kind");
        assert!(result.is_empty());
    }
}
