//! User Session Registry
//!
//! 「どの接続がどの Room のどのユーザーか」の唯一の情報源です。
//! 同じ Room に対する変更操作は全て、呼び出し側が Room ロックを保持した状態で行います。

use std::sync::Arc;

use crate::domain::{ConnectionId, RepositoryError, RoomId, User, UserId, UserRepository};

use super::error::{ChatError, ConflictKind, NotFoundKind};

pub struct SessionRegistry {
    users: Arc<dyn UserRepository>,
}

impl SessionRegistry {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// ユーザーを登録する
    ///
    /// 同じ Room に同名のアクティブユーザーがいれば `Conflict(DuplicateUsername)`。
    pub async fn add(&self, user: User) -> Result<User, ChatError> {
        if self.users.exists_in_room(&user.username, &user.room_id).await? {
            return Err(ChatError::Conflict(ConflictKind::DuplicateUsername));
        }
        Ok(self.users.add(user).await?)
    }

    /// 接続に紐づくユーザーを取得（退出済みも含む）
    pub async fn get_by_connection(&self, connection_id: &ConnectionId) -> Result<User, ChatError> {
        Ok(self.users.get_by_connection(connection_id).await?)
    }

    pub async fn get_by_id(&self, user_id: &UserId) -> Result<User, ChatError> {
        Ok(self.users.get_by_id(user_id).await?)
    }

    /// 接続の有効なセッションを取得する
    ///
    /// セッションがない、または退出済みの場合は `None`。
    pub async fn find_live_session(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<User>, ChatError> {
        match self.users.get_by_connection(connection_id).await {
            Ok(user) if user.is_active() => Ok(Some(user)),
            Ok(_) | Err(RepositoryError::UserNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 接続の有効なセッションを取得する（なければ `NotFound(UserNotFound)`）
    pub async fn require_live_session(&self, connection_id: &ConnectionId) -> Result<User, ChatError> {
        self.find_live_session(connection_id)
            .await?
            .ok_or(ChatError::NotFound(NotFoundKind::UserNotFound))
    }

    /// Room のアクティブユーザーを参加順に取得
    pub async fn list_active(&self, room_id: &RoomId) -> Result<Vec<User>, ChatError> {
        Ok(self.users.list_active_in_room(room_id).await?)
    }

    /// 指定ユーザーを除いたアクティブユーザー数
    pub async fn count_active_excluding(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<usize, ChatError> {
        let users = self.users.list_active_in_room(room_id).await?;
        Ok(users.iter().filter(|user| &user.id != user_id).count())
    }

    pub async fn mark_left(&self, user_id: &UserId) -> Result<(), ChatError> {
        Ok(self.users.mark_left(user_id).await?)
    }

    /// ユーザーのレコードを削除する（参加処理の取り消し用）
    pub async fn remove(&self, user_id: &UserId) -> Result<(), ChatError> {
        Ok(self.users.remove(user_id).await?)
    }

    /// Room の全ユーザーを削除する（Room の後片付け専用）
    pub async fn remove_all(&self, room_id: &RoomId) -> Result<(), ChatError> {
        Ok(self.users.remove_all_in_room(room_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            IdFactory, RoomName, RoomRepository, Timestamp, Username,
            repository::MockUserRepository,
        },
        infrastructure::repository::InMemoryChatStore,
        usecase::error::FailureKind,
    };

    async fn setup() -> (Arc<InMemoryChatStore>, SessionRegistry, RoomId) {
        let store = Arc::new(InMemoryChatStore::new());
        let room = store
            .create_if_absent(&RoomName::new("general".to_string()).unwrap())
            .await
            .unwrap();
        let registry = SessionRegistry::new(store.clone());
        (store, registry, room.id)
    }

    fn user(name: &str, room_id: RoomId, joined_at: i64) -> User {
        User::new(
            IdFactory::user_id(),
            Username::new(name.to_string()).unwrap(),
            IdFactory::connection_id(),
            room_id,
            None,
            Timestamp::new(joined_at),
        )
    }

    #[tokio::test]
    async fn test_add_duplicate_username_conflicts() {
        // テスト項目: 同じ Room に同名のアクティブユーザーがいると登録できない
        // given (前提条件):
        let (_store, registry, room_id) = setup().await;
        registry.add(user("alice", room_id, 1)).await.unwrap();

        // when (操作):
        let result = registry.add(user("alice", room_id, 2)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ChatError::Conflict(ConflictKind::DuplicateUsername))
        );
    }

    #[tokio::test]
    async fn test_left_user_frees_username() {
        // テスト項目: 退出済みユーザーの名前は再利用できる
        // given (前提条件):
        let (_store, registry, room_id) = setup().await;
        let alice = registry.add(user("alice", room_id, 1)).await.unwrap();
        registry.mark_left(&alice.id).await.unwrap();

        // when (操作):
        let result = registry.add(user("alice", room_id, 2)).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_find_live_session_ignores_left_user() {
        // テスト項目: 退出済みユーザーの接続は有効なセッションとして扱われない
        // given (前提条件):
        let (_store, registry, room_id) = setup().await;
        let alice = registry.add(user("alice", room_id, 1)).await.unwrap();

        // when (操作):
        let before = registry.find_live_session(&alice.connection_id).await.unwrap();
        registry.mark_left(&alice.id).await.unwrap();
        let after = registry.find_live_session(&alice.connection_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(before, Some(alice.clone()));
        assert_eq!(after, None);
        assert_eq!(
            registry.require_live_session(&alice.connection_id).await,
            Err(ChatError::NotFound(NotFoundKind::UserNotFound))
        );
    }

    #[tokio::test]
    async fn test_get_by_connection_includes_left_user_until_removed() {
        // テスト項目: 退出済みユーザーも接続から引けるが、remove_all 後は引けない
        // given (前提条件):
        let (_store, registry, room_id) = setup().await;
        let alice = registry.add(user("alice", room_id, 1)).await.unwrap();
        let bob = registry.add(user("bob", room_id, 2)).await.unwrap();
        registry.mark_left(&alice.id).await.unwrap();

        // when (操作):
        let left = registry.get_by_connection(&alice.connection_id).await.unwrap();
        registry.remove_all(&room_id).await.unwrap();

        // then (期待する結果):
        assert!(!left.is_active());
        assert_eq!(
            registry.get_by_connection(&bob.connection_id).await,
            Err(ChatError::NotFound(NotFoundKind::UserNotFound))
        );
        assert!(registry.list_active(&room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_active_excluding() {
        // テスト項目: 指定ユーザーを除いたアクティブユーザー数を数える
        // given (前提条件):
        let (_store, registry, room_id) = setup().await;
        let alice = registry.add(user("alice", room_id, 1)).await.unwrap();
        let bob = registry.add(user("bob", room_id, 2)).await.unwrap();
        let carol = registry.add(user("carol", room_id, 3)).await.unwrap();
        registry.mark_left(&carol.id).await.unwrap();

        // when (操作):
        let others = registry.count_active_excluding(&room_id, &alice.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(others, 1);
        let names: Vec<String> = registry
            .list_active(&room_id)
            .await
            .unwrap()
            .iter()
            .map(|u| u.username.to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(bob.is_active());
    }

    #[tokio::test]
    async fn test_find_live_session_propagates_store_failure() {
        // テスト項目: ストア障害は「セッションなし」ではなくエラーとして返される
        // given (前提条件):
        let mut users = MockUserRepository::new();
        users
            .expect_get_by_connection()
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));
        let registry = SessionRegistry::new(Arc::new(users));

        // when (操作):
        let result = registry
            .find_live_session(&IdFactory::connection_id())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ChatError::Failure(FailureKind::Storage("timeout".to_string())))
        );
    }
}
