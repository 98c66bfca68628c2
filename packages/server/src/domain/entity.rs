//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};

use super::value_object::{
    ConnectionId, ImageUrl, MessageId, MessageText, RoomId, RoomName, Timestamp, UserId, Username,
};

/// A named chat room.
///
/// Membership and history live in the session registry and message store;
/// the room itself only carries identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Unique human-chosen name
    pub name: RoomName,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
}

impl Room {
    /// Create a new room with the given identity
    pub fn new(id: RoomId, name: RoomName, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }
}

/// A user bound to one connection in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    pub avatar: Option<ImageUrl>,
    /// Soft-leave marker; left users keep their row until the room drains
    pub has_left: bool,
    pub joined_at: Timestamp,
}

impl User {
    /// Create a new active user
    pub fn new(
        id: UserId,
        username: Username,
        connection_id: ConnectionId,
        room_id: RoomId,
        avatar: Option<ImageUrl>,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            connection_id,
            room_id,
            avatar,
            has_left: false,
            joined_at,
        }
    }

    /// Whether the user still counts as a room member
    pub fn is_active(&self) -> bool {
        !self.has_left
    }
}

/// Content of a message.
///
/// Text and image bodies are user-authored; notices are posted by the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Text(MessageText),
    Image(ImageUrl),
    Notice(String),
}

/// Represents a persisted chat event in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Author for user content, subject of the notice otherwise
    pub user_id: UserId,
    pub room_id: RoomId,
    pub body: MessageBody,
    /// Server-assigned at persistence time
    pub date: Timestamp,
}

impl Message {
    /// Create a new message
    pub fn new(
        id: MessageId,
        user_id: UserId,
        room_id: RoomId,
        body: MessageBody,
        date: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            room_id,
            body,
            date,
        }
    }

    /// Text content; empty for images
    pub fn text(&self) -> &str {
        match &self.body {
            MessageBody::Text(text) => text.as_str(),
            MessageBody::Notice(notice) => notice,
            MessageBody::Image(_) => "",
        }
    }

    /// `true` for user-authored content, `false` for room notices
    pub fn from_user(&self) -> bool {
        !matches!(self.body, MessageBody::Notice(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self.body, MessageBody::Image(_))
    }

    /// Image URL; empty unless this is an image message
    pub fn image_url(&self) -> &str {
        match &self.body {
            MessageBody::Image(url) => url.as_str(),
            _ => "",
        }
    }

    /// Whether `user_id` authored this message
    ///
    /// Notices have no author.
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.from_user() && &self.user_id == user_id
    }
}
