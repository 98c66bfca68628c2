//! Route table.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{
    handler::{
        get_room_detail, get_room_messages, get_rooms, health_check, post_room_image,
        upload_avatar, websocket_handler,
    },
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let upload_route = state.config.upload_route();
    // Replaces axum's 2 MB default on the upload endpoints
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/rooms/{room_id}/messages", get(get_room_messages))
        .route(
            "/api/rooms/{room_id}/images",
            post(post_room_image).layer(upload_limit),
        )
        .route("/api/uploads/avatar", post(upload_avatar).layer(upload_limit))
        .nest_service(&upload_route, uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
