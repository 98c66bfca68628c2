//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::BytesRejection},
    http::StatusCode,
};

use crate::{
    domain::{RoomId, UploadKind, UserId},
    infrastructure::dto::{
        http::{ImageMessageQuery, RoomDetailDto, RoomSummaryDto, UploadResponseDto},
        websocket::MessageDto,
    },
    ui::state::AppState,
    usecase::{ChatError, FailureKind, NotFoundKind, SenderRef},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, ChatError> {
    let rooms = state.coordinator.list_rooms().await?;
    Ok(Json(
        rooms
            .iter()
            .map(|snapshot| RoomSummaryDto::new(&snapshot.room, &snapshot.users))
            .collect(),
    ))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ChatError> {
    let room_id = parse_room_id(&room_id)?;
    let snapshot = state.coordinator.room_detail(&room_id).await?;
    Ok(Json(RoomDetailDto::new(&snapshot.room, &snapshot.users)))
}

/// Get the message history of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ChatError> {
    let room_id = parse_room_id(&room_id)?;
    let history = state.coordinator.room_history(&room_id).await?;
    Ok(Json(history.iter().map(MessageDto::from).collect()))
}

/// Upload an avatar image; the returned URL is passed to `join-room`
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UploadResponseDto>), ChatError> {
    let body = upload_body(body)?;
    let url = state
        .blob_store
        .upload(body, UploadKind::Avatar)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponseDto {
            url: url.to_string(),
        }),
    ))
}

/// Upload an image and post it to the room as the given user
pub async fn post_room_image(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ImageMessageQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<MessageDto>), ChatError> {
    let room_id = parse_room_id(&room_id)?;
    let user_id =
        UserId::parse(&query.user_id).map_err(|e| ChatError::invalid("user_id", &e))?;
    let body = upload_body(body)?;

    let url = state
        .blob_store
        .upload(body, UploadKind::MessageImage)
        .await?;
    let view = state
        .coordinator
        .send_image(SenderRef::User(user_id), &room_id, url.to_string())
        .await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&view))))
}

/// A path segment that is not a room id names no room
fn parse_room_id(raw: &str) -> Result<RoomId, ChatError> {
    RoomId::parse(raw).map_err(|_| ChatError::NotFound(NotFoundKind::RoomNotFound))
}

/// A body that could not be buffered (e.g. over the size limit) is a failed upload
fn upload_body(body: Result<Bytes, BytesRejection>) -> Result<Vec<u8>, ChatError> {
    body.map(|bytes| bytes.to_vec()).map_err(|rejection| {
        ChatError::Failure(FailureKind::CantUploadImage(rejection.body_text()))
    })
}
