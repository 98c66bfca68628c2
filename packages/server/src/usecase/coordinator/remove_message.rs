//! UseCase: メッセージの削除
//!
//! 削除できるのは作者本人だけです。システム通知には作者がいないため削除できません。

use crate::domain::{ConnectionId, MessageId};

use super::{
    super::{
        error::{ChatError, FailureKind},
        outbound::{ChatEvent, Outbound},
    },
    RoomCoordinator,
};

impl RoomCoordinator {
    /// メッセージを削除し、Room に `message-removed` を配信する
    pub async fn remove_message(
        &self,
        connection_id: &ConnectionId,
        message_id: &MessageId,
    ) -> Result<(), ChatError> {
        self.messages.get(message_id).await?;
        let (_guard, room, user) = self.lock_live_session(connection_id).await?;

        // Re-read under the lock; a concurrent removal or drain may have won
        let message = self.messages.get(message_id).await?;
        if !message.is_authored_by(&user.id) {
            tracing::warn!(
                "User '{}' tried to remove message {} they did not author",
                user.username,
                message.id
            );
            return Err(ChatError::Failure(FailureKind::MessageIsNotRemoved));
        }

        self.messages.remove(message_id).await?;
        self.dispatcher
            .dispatch(vec![Outbound::to_room(
                room.id,
                ChatEvent::MessageRemoved {
                    room_id: room.id,
                    message_id: message.id,
                },
            )])
            .await;

        tracing::info!("User '{}' removed message {}", user.username, message.id);
        Ok(())
    }
}
