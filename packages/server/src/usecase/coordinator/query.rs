//! 読み取り専用の問い合わせ（HTTP API 用）

use crate::domain::{Room, RoomId, User};

use super::{super::error::ChatError, super::outbound::MessageView, RoomCoordinator};

/// Room とそのアクティブユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: Room,
    pub users: Vec<User>,
}

impl RoomCoordinator {
    /// 全ての Room を作成順に取得
    pub async fn list_rooms(&self) -> Result<Vec<RoomSnapshot>, ChatError> {
        let rooms = self.directory.list().await?;
        let mut snapshots = Vec::with_capacity(rooms.len());
        for room in rooms {
            let users = self.sessions.list_active(&room.id).await?;
            snapshots.push(RoomSnapshot { room, users });
        }
        Ok(snapshots)
    }

    /// Room の詳細を取得
    pub async fn room_detail(&self, room_id: &RoomId) -> Result<RoomSnapshot, ChatError> {
        let room = self.directory.get(room_id).await?;
        let users = self.sessions.list_active(&room.id).await?;
        Ok(RoomSnapshot { room, users })
    }

    /// Room の履歴を日付の昇順で取得
    pub async fn room_history(&self, room_id: &RoomId) -> Result<Vec<MessageView>, ChatError> {
        let room = self.directory.get(room_id).await?;
        let messages = self.messages.history(&room.id).await?;
        self.message_views(messages).await
    }
}
