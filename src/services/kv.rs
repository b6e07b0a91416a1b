//! Key-value collaborator capability.
//!
//! The external store offers only `get(key)` / `put(key, value)` semantics
//! with no transactions. The gateway talks to it through the [`KeyValueStore`]
//! trait so the HTTP-backed store, an in-process memory store (local runs and
//! tests) and a null store (binding not configured) are interchangeable at
//! construction time.

use crate::core::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Capability interface of the external key-value collaborator.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Whether a real store is configured behind this handle.
    fn available(&self) -> bool {
        true
    }
}

/// HTTP-backed store client against the external key-value service.
///
/// Keys map onto `<base>/kv/<key>`; a 404 on read is an absent key, any
/// transport failure or unexpected status is a storage error.
pub struct HttpKeyValueStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpKeyValueStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/kv/{}", self.base_url, key)
    }
}

#[async_trait]
impl KeyValueStore for HttpKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.key_url(key))
            .send()
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(GatewayError::Storage(format!(
                "kv get returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        Ok(Some(body))
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let response = self
            .client
            .put(self.key_url(key))
            .body(value)
            .send()
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Storage(format!(
                "kv put returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// In-process store used for local runs and tests.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store substituted when no key-value binding is configured.
///
/// Every call fails with a storage error; the read path of the message log
/// swallows it into an empty list while writes surface it to the caller.
pub struct NullKeyValueStore;

#[async_trait]
impl KeyValueStore for NullKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(GatewayError::Storage(
            "key-value binding not configured".to_string(),
        ))
    }

    async fn put(&self, _key: &str, _value: String) -> Result<()> {
        Err(GatewayError::Storage(
            "key-value binding not configured".to_string(),
        ))
    }

    fn available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get("room:lobby:messages").await.unwrap(), None);

        store
            .put("room:lobby:messages", "[]".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("room:lobby:messages").await.unwrap(),
            Some("[]".to_string())
        );

        store
            .put("room:lobby:messages", "[1]".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("room:lobby:messages").await.unwrap(),
            Some("[1]".to_string())
        );
    }

    #[tokio::test]
    async fn test_null_store_errors() {
        let store = NullKeyValueStore;

        assert!(!store.available());
        assert!(store.get("any").await.is_err());
        assert!(store.put("any", "value".to_string()).await.is_err());
    }

    #[test]
    fn test_http_store_key_url() {
        let store = HttpKeyValueStore::new(reqwest::Client::new(), "http://localhost:9000/");
        assert_eq!(
            store.key_url("dm:alice:bob"),
            "http://localhost:9000/kv/dm:alice:bob"
        );
    }
}
