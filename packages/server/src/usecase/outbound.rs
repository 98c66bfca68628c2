//! Coordinator outputs consumed by the broadcast dispatcher.

use crate::domain::{ConnectionId, ImageUrl, Message, MessageId, RoomId, User, UserId, Username};

/// Delivery scope of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Room(RoomId),
    Connection(ConnectionId),
}

/// Display data of a message author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: UserId,
    pub username: Username,
    pub avatar: Option<ImageUrl>,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// A message with its author resolved for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub message: Message,
    /// `None` once the author record is gone
    pub author: Option<Author>,
}

/// Room-facing events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Joined { user: User },
    RoomUsers { room_id: RoomId, users: Vec<User> },
    NewMessage(MessageView),
    MessageHistory { room_id: RoomId, messages: Vec<MessageView> },
    MessageRemoved { room_id: RoomId, message_id: MessageId },
}

/// One instruction for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Subscribe {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    Unsubscribe {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    /// Drop the broadcast group of a drained room
    CloseGroup { room_id: RoomId },
    Notify { scope: Scope, event: ChatEvent },
}

impl Outbound {
    pub fn to_room(room_id: RoomId, event: ChatEvent) -> Self {
        Outbound::Notify {
            scope: Scope::Room(room_id),
            event,
        }
    }

    pub fn to_connection(connection_id: ConnectionId, event: ChatEvent) -> Self {
        Outbound::Notify {
            scope: Scope::Connection(connection_id),
            event,
        }
    }
}
