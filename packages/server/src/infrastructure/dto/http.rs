//! HTTP API response DTOs for the chat application.

use hiroba_shared::time::timestamp_to_jst_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::{Room, User};

/// Room summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub participants: Vec<String>,
    pub created_at: String, // ISO 8601
}

/// Room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub created_at: String, // ISO 8601
}

/// Participant detail for room detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub user_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub joined_at: String, // ISO 8601
}

/// Result of an image upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponseDto {
    pub url: String,
}

/// Query of the image message endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ImageMessageQuery {
    pub user_id: String,
}

impl RoomSummaryDto {
    pub fn new(room: &Room, users: &[User]) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name.to_string(),
            participants: users.iter().map(|u| u.username.to_string()).collect(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

impl RoomDetailDto {
    pub fn new(room: &Room, users: &[User]) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name.to_string(),
            participants: users.iter().map(ParticipantDetailDto::from).collect(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&User> for ParticipantDetailDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.to_string(),
            avatar: user.avatar.as_ref().map(ToString::to_string),
            joined_at: timestamp_to_jst_rfc3339(user.joined_at.value()),
        }
    }
}
