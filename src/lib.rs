//! Chat Gateway - an edge HTTP gateway fronting a chat product
//!
//! This library provides the request router and streaming/storage mediation
//! layer for a chat product with two conversational modes:
//!
//! - **Streaming AI assistant**: `/api/chat` relays the inference
//!   collaborator's byte stream to the caller while it is still produced
//! - **Social chat**: append-only room and direct-message logs persisted
//!   through an external key-value collaborator
//! - **Reverse proxy**: configured path prefixes are forwarded to named
//!   upstream origins with hop-by-hop headers stripped
//! - **Asset serving**: a named logo from a binary-object collaborator with
//!   a proxy fallback, plus static-site passthrough
//!
//! # Architecture
//!
//! The codebase is organized into three layers:
//!
//! - [`core`]: configuration, error handling, middleware
//! - [`services`]: collaborator capability traits and the message log store
//!   adapter
//! - [`api`]: the request router, HTTP handlers and mediators
//!
//! # Configuration
//!
//! Configuration is loaded once at startup from a YAML file (path in the
//! `CONFIG_PATH` environment variable, default `gateway.yaml`; defaults are
//! used when the file is absent). `HOST` and `PORT` override the file.

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState};
pub use core::{GatewayConfig, GatewayError, Result};
pub use services::MessageLog;
