//! WebSocket message DTOs for the chat application.
//!
//! Frames are JSON objects tagged by `type` (kebab-case).

use serde::{Deserialize, Serialize};

use crate::{
    domain::User,
    usecase::{
        error::{ChatError, FieldViolation},
        outbound::{ChatEvent, MessageView},
    },
};

/// Inbound frames sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        username: String,
        room_name: String,
        #[serde(default)]
        avatar: Option<String>,
    },
    SendMessage {
        text: String,
    },
    SendImage {
        room_id: String,
        image_url: String,
    },
    RemoveMessage {
        message_id: String,
    },
}

/// User information as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    pub avatar: Option<String>,
    /// Unix timestamp (milliseconds since epoch) in JST
    pub joined_at: i64,
}

/// Message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub message_id: String,
    pub user_id: String,
    pub room_id: String,
    /// Author name, absent for messages whose author record is gone
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub text: String,
    /// Unix timestamp (milliseconds since epoch) in JST
    pub date: i64,
    pub from_user: bool,
    pub is_image: bool,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationDto {
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub kind: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationDto>,
}

/// Outbound frames sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Joined {
        user: UserDto,
    },
    RoomUsers {
        room_id: String,
        users: Vec<UserDto>,
    },
    NewMessage {
        message: MessageDto,
    },
    MessageHistory {
        room_id: String,
        messages: Vec<MessageDto>,
    },
    MessageRemoved {
        room_id: String,
        message_id: String,
    },
    Error {
        error: ErrorDto,
    },
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.to_string(),
            room_id: user.room_id.to_string(),
            avatar: user.avatar.as_ref().map(ToString::to_string),
            joined_at: user.joined_at.value(),
        }
    }
}

impl From<&MessageView> for MessageDto {
    fn from(view: &MessageView) -> Self {
        let message = &view.message;
        Self {
            message_id: message.id.to_string(),
            user_id: message.user_id.to_string(),
            room_id: message.room_id.to_string(),
            username: view.author.as_ref().map(|a| a.username.to_string()),
            avatar: view
                .author
                .as_ref()
                .and_then(|a| a.avatar.as_ref())
                .map(ToString::to_string),
            text: message.text().to_string(),
            date: message.date.value(),
            from_user: message.from_user(),
            is_image: message.is_image(),
            image_url: message.image_url().to_string(),
        }
    }
}

impl From<&FieldViolation> for ViolationDto {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field: violation.field.clone(),
            code: violation.code.clone(),
            message: violation.message.clone(),
        }
    }
}

impl From<&ChatError> for ErrorDto {
    fn from(error: &ChatError) -> Self {
        Self {
            kind: error.kind().to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
            violations: error.violations().iter().map(ViolationDto::from).collect(),
        }
    }
}

impl From<&ChatEvent> for ServerMessage {
    fn from(event: &ChatEvent) -> Self {
        match event {
            ChatEvent::Joined { user } => ServerMessage::Joined { user: user.into() },
            ChatEvent::RoomUsers { room_id, users } => ServerMessage::RoomUsers {
                room_id: room_id.to_string(),
                users: users.iter().map(UserDto::from).collect(),
            },
            ChatEvent::NewMessage(view) => ServerMessage::NewMessage {
                message: view.into(),
            },
            ChatEvent::MessageHistory { room_id, messages } => ServerMessage::MessageHistory {
                room_id: room_id.to_string(),
                messages: messages.iter().map(MessageDto::from).collect(),
            },
            ChatEvent::MessageRemoved {
                room_id,
                message_id,
            } => ServerMessage::MessageRemoved {
                room_id: room_id.to_string(),
                message_id: message_id.to_string(),
            },
        }
    }
}

impl From<&ChatError> for ServerMessage {
    fn from(error: &ChatError) -> Self {
        ServerMessage::Error {
            error: error.into(),
        }
    }
}
