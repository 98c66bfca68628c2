//! InMemory User Repository 実装

use async_trait::async_trait;

use crate::domain::{ConnectionId, RepositoryError, RoomId, User, UserId, UserRepository, Username};

use super::InMemoryChatStore;

#[async_trait]
impl UserRepository for InMemoryChatStore {
    async fn add(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.rooms.contains_key(&user.room_id) {
            return Err(RepositoryError::RoomNotFound(user.room_id.to_string()));
        }
        if tables.user_ids_by_connection.contains_key(&user.connection_id) {
            return Err(RepositoryError::ConnectionInUse(
                user.connection_id.to_string(),
            ));
        }
        let duplicate = tables.users.values().any(|existing| {
            existing.is_active()
                && existing.room_id == user.room_id
                && existing.username == user.username
        });
        if duplicate {
            return Err(RepositoryError::DuplicateUsername {
                username: user.username.to_string(),
                room_id: user.room_id.to_string(),
            });
        }

        tables
            .user_ids_by_connection
            .insert(user.connection_id, user.id);
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_by_id(&self, user_id: &UserId) -> Result<User, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))
    }

    async fn get_by_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<User, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .user_ids_by_connection
            .get(connection_id)
            .and_then(|user_id| tables.users.get(user_id))
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(connection_id.to_string()))
    }

    async fn exists_in_room(
        &self,
        username: &Username,
        room_id: &RoomId,
    ) -> Result<bool, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|user| {
            user.is_active() && &user.room_id == room_id && &user.username == username
        }))
    }

    async fn list_active_in_room(&self, room_id: &RoomId) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.is_active() && &user.room_id == room_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.username.as_str().cmp(b.username.as_str()))
        });
        Ok(users)
    }

    async fn mark_left(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))?;
        user.has_left = true;
        Ok(())
    }

    async fn remove(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .remove(user_id)
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))?;
        if tables.user_ids_by_connection.get(&user.connection_id) == Some(user_id) {
            tables.user_ids_by_connection.remove(&user.connection_id);
        }
        Ok(())
    }

    async fn remove_all_in_room(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let removed: Vec<User> = tables
            .users
            .values()
            .filter(|user| &user.room_id == room_id)
            .cloned()
            .collect();
        for user in removed {
            tables.users.remove(&user.id);
            if tables.user_ids_by_connection.get(&user.connection_id) == Some(&user.id) {
                tables.user_ids_by_connection.remove(&user.connection_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{room_name, user_in};
    use super::*;
    use crate::domain::RoomRepository;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ユーザーの追加・取得・退出・削除
    // - (username, room_id) の一意性がアクティブユーザーの間でのみ保たれること
    // - 接続 ID とユーザーが 1:1 であること
    // ========================================

    #[tokio::test]
    async fn test_add_and_get_by_connection() {
        // テスト項目: 追加したユーザーを接続 ID と ユーザー ID で取得できる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = user_in(&room, "alice", 1);

        // when (操作):
        store.add(alice.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            store.get_by_connection(&alice.connection_id).await.unwrap(),
            alice
        );
        assert_eq!(
            UserRepository::get_by_id(&store, &alice.id).await.unwrap(),
            alice
        );
    }

    #[tokio::test]
    async fn test_add_duplicate_username_fails() {
        // テスト項目: 同じ Room に同名のアクティブユーザーがいると追加できない
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        store.add(user_in(&room, "alice", 1)).await.unwrap();

        // when (操作):
        let result = store.add(user_in(&room, "alice", 2)).await;

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::DuplicateUsername { .. }
        ));
    }

    #[tokio::test]
    async fn test_same_username_in_other_room_is_allowed() {
        // テスト項目: ユーザー名の一意性は Room 単位
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let general = store.create_if_absent(&room_name("general")).await.unwrap();
        let random = store.create_if_absent(&room_name("random")).await.unwrap();
        store.add(user_in(&general, "alice", 1)).await.unwrap();

        // when (操作):
        let result = store.add(user_in(&random, "alice", 2)).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_left_user_frees_username() {
        // テスト項目: 退出済みユーザーの名前は再利用できる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = store.add(user_in(&room, "alice", 1)).await.unwrap();
        store.mark_left(&alice.id).await.unwrap();

        // when (操作):
        let exists = store
            .exists_in_room(&alice.username, &room.id)
            .await
            .unwrap();
        let result = store.add(user_in(&room, "alice", 2)).await;

        // then (期待する結果):
        assert!(!exists);
        assert!(result.is_ok());
        assert!(
            UserRepository::get_by_id(&store, &alice.id)
                .await
                .unwrap()
                .has_left
        );
    }

    #[tokio::test]
    async fn test_connection_bound_once() {
        // テスト項目: 同じ接続 ID で 2 人目のユーザーは追加できない
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = store.add(user_in(&room, "alice", 1)).await.unwrap();
        let mut bob = user_in(&room, "bob", 2);
        bob.connection_id = alice.connection_id;

        // when (操作):
        let result = store.add(bob).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RepositoryError::ConnectionInUse(alice.connection_id.to_string())
        );
    }

    #[tokio::test]
    async fn test_add_to_missing_room_fails() {
        // テスト項目: 存在しない Room にはユーザーを追加できない
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        store.delete(&room.id).await.unwrap();

        // when (操作):
        let result = store.add(user_in(&room, "alice", 1)).await;

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::RoomNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_active_sorted_by_join_time() {
        // テスト項目: アクティブユーザーが参加時刻順に返され、退出済みは含まれない
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        store.add(user_in(&room, "charlie", 3)).await.unwrap();
        store.add(user_in(&room, "alice", 1)).await.unwrap();
        let bob = store.add(user_in(&room, "bob", 2)).await.unwrap();
        store.mark_left(&bob.id).await.unwrap();

        // when (操作):
        let users = store.list_active_in_room(&room.id).await.unwrap();

        // then (期待する結果):
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "charlie"]);
    }

    #[tokio::test]
    async fn test_remove_unbinds_connection() {
        // テスト項目: ユーザーを削除すると接続 ID からも引けなくなる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = store.add(user_in(&room, "alice", 1)).await.unwrap();

        // when (操作):
        store.remove(&alice.id).await.unwrap();

        // then (期待する結果):
        assert!(store.get_by_connection(&alice.connection_id).await.is_err());
        assert!(
            UserRepository::get_by_id(&store, &alice.id)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_remove_all_in_room() {
        // テスト項目: Room の全ユーザー（退出済みを含む）を削除できる
        // given (前提条件):
        let store = InMemoryChatStore::new();
        let room = store.create_if_absent(&room_name("general")).await.unwrap();
        let alice = store.add(user_in(&room, "alice", 1)).await.unwrap();
        store.add(user_in(&room, "bob", 2)).await.unwrap();
        store.mark_left(&alice.id).await.unwrap();

        // when (操作):
        UserRepository::remove_all_in_room(&store, &room.id)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(
            UserRepository::get_by_id(&store, &alice.id)
                .await
                .is_err()
        );
        assert!(store.list_active_in_room(&room.id).await.unwrap().is_empty());
    }
}
