//! Core functionality for the chat gateway.
//!
//! This module contains fundamental components used throughout the
//! application:
//! - Configuration management
//! - Error handling
//! - HTTP middleware

pub mod config;
pub mod error;
pub mod middleware;

// Re-export commonly used types
pub use config::{AssetConfig, BindingsConfig, GatewayConfig, RouteTarget, ServerConfig};
pub use error::{GatewayError, Result};
pub use middleware::{request_logging_middleware, security_headers_middleware};
