//! UseCase: 切断処理
//!
//! Transport の切断を契機に実行されます。セッションがない接続の切断は何もしません。
//! 最後のアクティブユーザーが抜けた Room は、メッセージ・ユーザーごと後片付けされます。

use crate::domain::{ConnectionId, DrainReport, RoomId, User};

use super::{
    super::{
        error::ChatError,
        message_store::left_notice,
        outbound::{Author, ChatEvent, MessageView, Outbound},
    },
    RoomCoordinator,
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// 参加していない（または退出済みの）接続だった
    NotJoined,
    /// ユーザーが退出し、Room には他のユーザーが残っている
    Left { user: User },
    /// 最後のユーザーが退出し、Room が後片付けされた
    RoomDrained { room_id: RoomId, report: DrainReport },
}

impl RoomCoordinator {
    /// 接続の切断を処理する（冪等）
    pub async fn disconnect(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<DisconnectOutcome, ChatError> {
        let (_guard, room, user) = match self.lock_live_session(connection_id).await {
            Ok(locked) => locked,
            Err(ChatError::NotFound(_)) => return Ok(DisconnectOutcome::NotJoined),
            Err(e) => return Err(e),
        };

        let others = self
            .sessions
            .count_active_excluding(&room.id, &user.id)
            .await?;

        if others == 0 {
            let report = self.directory.drain(&room).await?;
            self.dispatcher
                .dispatch(vec![
                    Outbound::Unsubscribe {
                        room_id: room.id,
                        connection_id: user.connection_id,
                    },
                    Outbound::CloseGroup { room_id: room.id },
                ])
                .await;
            return Ok(DisconnectOutcome::RoomDrained {
                room_id: room.id,
                report,
            });
        }

        self.sessions.mark_left(&user.id).await?;
        let roster = self.sessions.list_active(&room.id).await?;
        let notice = self.messages.append_notice(&user, left_notice(&user)).await?;

        self.dispatcher
            .dispatch(vec![
                Outbound::Unsubscribe {
                    room_id: room.id,
                    connection_id: user.connection_id,
                },
                Outbound::to_room(
                    room.id,
                    ChatEvent::RoomUsers {
                        room_id: room.id,
                        users: roster,
                    },
                ),
                Outbound::to_room(
                    room.id,
                    ChatEvent::NewMessage(MessageView {
                        message: notice,
                        author: Some(Author::from(&user)),
                    }),
                ),
            ])
            .await;

        tracing::info!("User '{}' left room '{}'", user.username, room.name);
        Ok(DisconnectOutcome::Left { user })
    }
}
