//! API layer for the chat gateway.
//!
//! This module contains the request router, all HTTP handlers, the
//! streaming and proxy mediators, and the request/response models.

pub mod assets;
pub mod chat;
pub mod dm;
pub mod models;
pub mod proxy;
pub mod rooms;
pub mod router;

// Re-export commonly used types
pub use models::{
    BindingsResponse, ChatRequest, ChatTurn, DirectMessage, HealthResponse, PostAck, Role,
    RoomMessage,
};
pub use router::{build_router, AppState};
