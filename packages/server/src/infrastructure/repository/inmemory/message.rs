//! InMemory Message Repository 実装

use async_trait::async_trait;

use crate::domain::{Message, MessageId, MessageRepository, RepositoryError, RoomId};

use super::InMemoryChatStore;

#[async_trait]
impl MessageRepository for InMemoryChatStore {
    async fn save(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.rooms.contains_key(&message.room_id) {
            return Err(RepositoryError::RoomNotFound(message.room_id.to_string()));
        }

        tables.message_rooms.insert(message.id, message.room_id);
        tables
            .messages
            .entry(message.room_id)
            .or_default()
            .push(message.clone());

        Ok(message)
    }

    async fn get_by_id(&self, message_id: &MessageId) -> Result<Message, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .message_rooms
            .get(message_id)
            .and_then(|room_id| tables.messages.get(room_id))
            .and_then(|messages| messages.iter().find(|m| &m.id == message_id))
            .cloned()
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.to_string()))
    }

    async fn remove_by_id(&self, message_id: &MessageId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let room_id = tables
            .message_rooms
            .remove(message_id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.to_string()))?;
        if let Some(messages) = tables.messages.get_mut(&room_id) {
            messages.retain(|m| &m.id != message_id);
        }
        Ok(())
    }

    async fn list_by_room_ordered(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut messages = tables.messages.get(room_id).cloned().unwrap_or_default();
        // Stable sort keeps persistence order for equal dates
        messages.sort_by_key(|m| m.date);
        Ok(messages)
    }

    async fn remove_all_in_room(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let removed = tables.messages.remove(room_id).unwrap_or_default();
        for message in removed {
            tables.message_rooms.remove(&message.id);
        }
        Ok(())
    }
}
