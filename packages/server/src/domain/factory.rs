//! Domain factories for creating domain entities and value objects.

use uuid::Uuid;

use super::{ConnectionId, MessageId, RoomId, UserId};

/// Factory for generating identifier instances.
///
/// This factory encapsulates the logic for generating new identifiers,
/// separating the generation concern from the parsing logic in the
/// identifier value objects.
pub struct IdFactory;

impl IdFactory {
    /// Generate a new RoomId with a random UUID v4.
    pub fn room_id() -> RoomId {
        RoomId::from_uuid(Uuid::new_v4())
    }

    /// Generate a new UserId with a random UUID v4.
    pub fn user_id() -> UserId {
        UserId::from_uuid(Uuid::new_v4())
    }

    /// Generate a new MessageId with a random UUID v4.
    pub fn message_id() -> MessageId {
        MessageId::from_uuid(Uuid::new_v4())
    }

    /// Generate a new ConnectionId with a random UUID v4.
    pub fn connection_id() -> ConnectionId {
        ConnectionId::from_uuid(Uuid::new_v4())
    }
}
