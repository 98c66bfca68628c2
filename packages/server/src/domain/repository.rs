//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各 Repository は互いを構築せず、UseCase 層で個別に注入されます。
//! 実装は 1 つの Room の中で read-after-write の一貫性を保証する必要があります。

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{
    ConnectionId, Message, MessageId, RepositoryError, Room, RoomId, RoomName, User, UserId,
    Username,
};

/// Room Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 名前で Room を取得し、存在しなければ作成する（名前に対して冪等）
    async fn create_if_absent(&self, name: &RoomName) -> Result<Room, RepositoryError>;

    /// ID で Room を取得
    async fn get_by_id(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// Room を削除
    async fn delete(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// 全ての Room を取得
    async fn list(&self) -> Result<Vec<Room>, RepositoryError>;
}

/// User Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを追加（同じ Room に同名のアクティブユーザーがいればエラー）
    async fn add(&self, user: User) -> Result<User, RepositoryError>;

    /// ID でユーザーを取得
    async fn get_by_id(&self, user_id: &UserId) -> Result<User, RepositoryError>;

    /// 接続 ID でユーザーを取得
    async fn get_by_connection(&self, connection_id: &ConnectionId)
    -> Result<User, RepositoryError>;

    /// 同じ Room に同名のアクティブユーザーが存在するか
    async fn exists_in_room(
        &self,
        username: &Username,
        room_id: &RoomId,
    ) -> Result<bool, RepositoryError>;

    /// Room のアクティブユーザー一覧を取得
    async fn list_active_in_room(&self, room_id: &RoomId) -> Result<Vec<User>, RepositoryError>;

    /// ユーザーを退出済みにする（レコードは残す）
    async fn mark_left(&self, user_id: &UserId) -> Result<(), RepositoryError>;

    /// ユーザーを 1 件削除
    async fn remove(&self, user_id: &UserId) -> Result<(), RepositoryError>;

    /// Room の全ユーザーを削除
    async fn remove_all_in_room(&self, room_id: &RoomId) -> Result<(), RepositoryError>;
}

/// Message Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存
    async fn save(&self, message: Message) -> Result<Message, RepositoryError>;

    /// ID でメッセージを取得
    async fn get_by_id(&self, message_id: &MessageId) -> Result<Message, RepositoryError>;

    /// ID でメッセージを削除
    async fn remove_by_id(&self, message_id: &MessageId) -> Result<(), RepositoryError>;

    /// Room の全メッセージを日付の昇順で取得
    async fn list_by_room_ordered(&self, room_id: &RoomId)
    -> Result<Vec<Message>, RepositoryError>;

    /// Room の全メッセージを削除
    async fn remove_all_in_room(&self, room_id: &RoomId) -> Result<(), RepositoryError>;
}

/// Result of a room teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub removed_messages: usize,
    pub removed_users: usize,
}

/// Room の後片付け（Drain）
///
/// メッセージ・ユーザー・Room を 1 回の操作でまとめて削除します。
/// 途中の状態（メッセージだけ消えて Room が残る等）は外部から観測できません。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomTeardown: Send + Sync {
    async fn drain(&self, room_id: &RoomId) -> Result<DrainReport, RepositoryError>;
}
