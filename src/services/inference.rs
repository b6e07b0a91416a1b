//! Inference collaborator capability.
//!
//! The inference engine exposes a single `run(model, input)` capability
//! returning a raw byte stream. The HTTP implementation asks for the
//! collaborator's unbuffered response representation so the stream can be
//! relayed to the caller before generation completes.

use crate::api::models::ChatTurn;
use crate::core::error::{GatewayError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;

/// A single generation request sent to the inference collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceInput {
    pub messages: Vec<ChatTurn>,
    pub max_tokens: u32,
}

/// Raw, unbuffered response from the inference collaborator.
pub struct InferenceStream {
    /// Content type reported by the collaborator, if any
    pub content_type: Option<String>,
    /// Response bytes as they are produced
    pub stream: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Capability interface of the inference collaborator.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Run a generation and hand back the raw byte stream.
    async fn run(&self, model: &str, input: InferenceInput) -> Result<InferenceStream>;

    /// Whether a real engine is configured behind this handle.
    fn available(&self) -> bool {
        true
    }
}

/// HTTP-backed inference client.
///
/// Posts the turn sequence to `<base>/run/<model>` and relays the response
/// body without materializing it.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn run(&self, model: &str, input: InferenceInput) -> Result<InferenceStream> {
        let url = format!("{}/run/{}", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .json(&input)
            .send()
            .await
            .map_err(|e| GatewayError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Inference(format!(
                "inference collaborator returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed();

        Ok(InferenceStream {
            content_type,
            stream,
        })
    }
}

/// Client substituted when no inference binding is configured.
pub struct NullInferenceClient;

#[async_trait]
impl InferenceClient for NullInferenceClient {
    async fn run(&self, _model: &str, _input: InferenceInput) -> Result<InferenceStream> {
        Err(GatewayError::Inference(
            "inference binding not configured".to_string(),
        ))
    }

    fn available(&self) -> bool {
        false
    }
}
