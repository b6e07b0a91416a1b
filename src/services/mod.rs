//! Collaborator capabilities and storage mediation.
//!
//! Each external collaborator (key-value store, inference engine, binary
//! objects) is reached through an explicit capability trait injected at
//! construction, with a null implementation substitutable when the binding
//! is not configured.

pub mod blobs;
pub mod inference;
pub mod kv;
pub mod message_log;

// Re-export commonly used types
pub use blobs::{BlobObject, BlobStore, DirBlobStore, NullBlobStore};
pub use inference::{
    HttpInferenceClient, InferenceClient, InferenceInput, InferenceStream, NullInferenceClient,
};
pub use kv::{HttpKeyValueStore, KeyValueStore, MemoryKeyValueStore, NullKeyValueStore};
pub use message_log::MessageLog;
