//! InMemory Room Repository / RoomTeardown 実装

use async_trait::async_trait;

use crate::domain::{
    DrainReport, IdFactory, RepositoryError, Room, RoomId, RoomName, RoomRepository, RoomTeardown,
    Timestamp,
};

use super::InMemoryChatStore;

#[async_trait]
impl RoomRepository for InMemoryChatStore {
    async fn create_if_absent(&self, name: &RoomName) -> Result<Room, RepositoryError> {
        let mut tables = self.tables.write().await;

        if let Some(room) = tables
            .room_ids_by_name
            .get(name)
            .and_then(|id| tables.rooms.get(id))
        {
            return Ok(room.clone());
        }

        let room = Room::new(IdFactory::room_id(), name.clone(), Timestamp::now());
        tables.room_ids_by_name.insert(name.clone(), room.id);
        tables.rooms.insert(room.id, room.clone());
        tracing::debug!("Created room '{}' ({})", room.name, room.id);

        Ok(room)
    }

    async fn get_by_id(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn delete(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let room = tables
            .rooms
            .remove(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        tables.room_ids_by_name.remove(&room.name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Room>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables.rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.created_at);
        Ok(rooms)
    }
}

#[async_trait]
impl RoomTeardown for InMemoryChatStore {
    async fn drain(&self, room_id: &RoomId) -> Result<DrainReport, RepositoryError> {
        let mut tables = self.tables.write().await;

        let room = tables
            .rooms
            .remove(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        tables.room_ids_by_name.remove(&room.name);

        let messages = tables.messages.remove(room_id).unwrap_or_default();
        for message in &messages {
            tables.message_rooms.remove(&message.id);
        }

        let user_ids: Vec<_> = tables
            .users
            .values()
            .filter(|user| &user.room_id == room_id)
            .map(|user| (user.id, user.connection_id))
            .collect();
        for (user_id, connection_id) in &user_ids {
            tables.users.remove(user_id);
            if tables.user_ids_by_connection.get(connection_id) == Some(user_id) {
                tables.user_ids_by_connection.remove(connection_id);
            }
        }

        Ok(DrainReport {
            removed_messages: messages.len(),
            removed_users: user_ids.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{room_name, text_message, user_in};
    use super::*;
    use crate::domain::{MessageRepository, UserRepository};
    use std::sync::Arc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Room の作成が名前に対して冪等であること
    // - drain がメッセージ・ユーザー・Room をまとめて削除すること
    //
    // 【なぜこのテストが必要か】
    // - 同じ名前への同時参加で Room が 2 つ作られると、メンバーが分断される
    // - drain の途中状態が見えると、Room だけ残る等の不整合になる
    // ========================================

    #[tokio::test]
    async fn test_create_if_absent_is_idempotent_by_name() {
        // テスト項目: 同じ名前で 2 回作成すると同じ Room が返される
        // given (前提条件):
        let store = InMemoryChatStore::new();

        // when (操作):
        let first = store.create_if_absent(&room_name("general")).await.unwrap();
        let second = store.create_if_absent(&room_name("general")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, second.id);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_if_absent_creates_one_room() {
        // テスト項目: 同時に作成しても Room は 1 つだけ作られる
        // given (前提条件):
        let store = Arc::new(InMemoryChatStore::new());

        // when (操作):
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.create_if_absent(&room_name("general")).await.unwrap()
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }

        // then (期待する結果):
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        // テスト項目: 存在しない Room の取得は RoomNotFound になる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room_id = IdFactory::room_id();

        // when (操作):
        let result = RoomRepository::get_by_id(&store, &room_id).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RepositoryError::RoomNotFound(room_id.to_string())
        );
    }

    #[tokio::test]
    async fn test_drain_removes_room_users_and_messages() {
        // テスト項目: drain 後は Room・ユーザー・メッセージが全て消えている
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = store.add(user_in(&room, "alice", 1)).await.unwrap();
        store
            .save(text_message(&alice, "Hello", 2))
            .await
            .unwrap();

        // when (操作):
        let report = store.drain(&room.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            report,
            DrainReport {
                removed_messages: 1,
                removed_users: 1
            }
        );
        assert!(RoomRepository::get_by_id(&store, &room.id).await.is_err());
        assert!(
            store
                .list_by_room_ordered(&room.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(store.get_by_connection(&alice.connection_id).await.is_err());
    }

    #[tokio::test]
    async fn test_drain_frees_room_name() {
        // テスト項目: drain 後に同じ名前で作成すると新しい Room になる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let old = store.create_if_absent(&room_name("general")).await.unwrap();
        store.drain(&old.id).await.unwrap();

        // when (操作):
        let new = store.create_if_absent(&room_name("general")).await.unwrap();

        // then (期待する結果):
        assert_ne!(old.id, new.id);
    }

    #[tokio::test]
    async fn test_drain_leaves_other_rooms_untouched() {
        // テスト項目: drain は対象 Room 以外のデータに影響しない
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let general = store.create_if_absent(&room_name("general")).await.unwrap();
        let random = store.create_if_absent(&room_name("random")).await.unwrap();
        let bob = store.add(user_in(&random, "bob", 1)).await.unwrap();
        store.save(text_message(&bob, "Hi", 2)).await.unwrap();

        // when (操作):
        store.drain(&general.id).await.unwrap();

        // then (期待する結果):
        assert!(RoomRepository::get_by_id(&store, &random.id).await.is_ok());
        assert_eq!(store.list_by_room_ordered(&random.id).await.unwrap().len(), 1);
        assert!(UserRepository::get_by_id(&store, &bob.id).await.is_ok());
    }
}
