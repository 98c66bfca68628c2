//! Handler modules for HTTP and WebSocket endpoints.

pub mod error;
pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{
    get_room_detail, get_room_messages, get_rooms, health_check, post_room_image, upload_avatar,
};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
