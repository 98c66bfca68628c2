//! UseCase: テキスト・画像メッセージの送信

use crate::domain::{
    ConnectionId, ImageUrl, Message, MessageText, Room, RoomId, User, UserId,
};

use super::{
    super::{
        error::{ChatError, NotFoundKind},
        outbound::{Author, ChatEvent, MessageView, Outbound},
    },
    RoomCoordinator,
};

/// 画像メッセージの送信者
///
/// WebSocket からは接続 ID、HTTP アップロードからはユーザー ID で指定されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRef {
    Connection(ConnectionId),
    User(UserId),
}

impl RoomCoordinator {
    /// テキストメッセージを送信する
    pub async fn send_message(
        &self,
        connection_id: &ConnectionId,
        text: String,
    ) -> Result<Message, ChatError> {
        // Session first so an unjoined connection gets UserNotFound
        self.sessions.require_live_session(connection_id).await?;
        let text = MessageText::new(text).map_err(|e| ChatError::invalid("text", &e))?;

        let (_guard, room, user) = self.lock_live_session(connection_id).await?;
        let message = self.messages.append_text(&user, text).await?;
        self.broadcast_new_message(&room, &user, message.clone())
            .await;

        tracing::debug!("User '{}' sent a message in room '{}'", user.username, room.name);
        Ok(message)
    }

    /// アップロード済み画像の URL をメッセージとして送信する
    ///
    /// 画像のバイト列はここには届きません。
    pub async fn send_image(
        &self,
        sender: SenderRef,
        room_id: &RoomId,
        image_url: String,
    ) -> Result<MessageView, ChatError> {
        let user = self.resolve_sender(sender).await?;
        let room = self.directory.get(room_id).await?;
        if user.room_id != room.id {
            return Err(ChatError::NotFound(NotFoundKind::UserNotFound));
        }
        let image_url = ImageUrl::new(image_url).map_err(|e| ChatError::invalid("image_url", &e))?;

        let _guard = self.directory.lock(&room.name).await;
        let user = self.resolve_sender(sender).await?;
        if user.room_id != room.id {
            return Err(ChatError::NotFound(NotFoundKind::UserNotFound));
        }

        let message = self.messages.append_image(&user, image_url).await?;
        let view = self.broadcast_new_message(&room, &user, message).await;

        tracing::debug!("User '{}' sent an image in room '{}'", user.username, room.name);
        Ok(view)
    }

    /// 送信者のアクティブなユーザーを解決する
    async fn resolve_sender(&self, sender: SenderRef) -> Result<User, ChatError> {
        match sender {
            SenderRef::Connection(connection_id) => {
                self.sessions.require_live_session(&connection_id).await
            }
            SenderRef::User(user_id) => {
                let user = self.sessions.get_by_id(&user_id).await?;
                if user.is_active() {
                    Ok(user)
                } else {
                    Err(ChatError::NotFound(NotFoundKind::UserNotFound))
                }
            }
        }
    }

    async fn broadcast_new_message(
        &self,
        room: &Room,
        author: &User,
        message: Message,
    ) -> MessageView {
        let view = MessageView {
            message,
            author: Some(Author::from(author)),
        };
        self.dispatcher
            .dispatch(vec![Outbound::to_room(
                room.id,
                ChatEvent::NewMessage(view.clone()),
            )])
            .await;
        view
    }
}
