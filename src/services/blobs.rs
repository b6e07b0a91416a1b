//! Binary-object collaborator capability.
//!
//! Serves the gateway's named assets. The directory-backed implementation
//! reads objects from disk and reports their content type; the null
//! implementation stands in when no blob binding is configured, letting the
//! asset route fall through to its proxy fallback.

use crate::core::error::{GatewayError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

/// A stored binary object together with its HTTP metadata.
pub struct BlobObject {
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Capability interface of the binary-object collaborator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the object stored under `name`, `None` when absent.
    async fn get(&self, name: &str) -> Result<Option<BlobObject>>;

    /// Whether a real object store is configured behind this handle.
    fn available(&self) -> bool {
        true
    }
}

/// Directory-backed blob store.
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for DirBlobStore {
    async fn get(&self, name: &str) -> Result<Option<BlobObject>> {
        // Object names are flat; anything path-like is not ours
        if name.contains('/') || name.contains("..") {
            return Ok(None);
        }

        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let content_type = mime_guess::from_path(&path)
                    .first_raw()
                    .map(|s| s.to_string());
                Ok(Some(BlobObject {
                    content_type,
                    body: Bytes::from(bytes),
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GatewayError::Storage(e.to_string())),
        }
    }
}

/// Store substituted when no blob binding is configured.
pub struct NullBlobStore;

#[async_trait]
impl BlobStore for NullBlobStore {
    async fn get(&self, _name: &str) -> Result<Option<BlobObject>> {
        Ok(None)
    }

    fn available(&self) -> bool {
        false
    }
}
