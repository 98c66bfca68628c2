//! Message Store Adapter
//!
//! Room ごとのメッセージの追記・取得・削除。ID と日時はここで採番されます。

use std::sync::Arc;

use crate::domain::{
    IdFactory, ImageUrl, Message, MessageBody, MessageId, MessageRepository, MessageText, RoomId,
    Timestamp, User,
};

use super::error::ChatError;

pub struct MessageStore {
    messages: Arc<dyn MessageRepository>,
}

impl MessageStore {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// ユーザーのテキストメッセージを保存
    pub async fn append_text(&self, author: &User, text: MessageText) -> Result<Message, ChatError> {
        self.append(author, MessageBody::Text(text)).await
    }

    /// ユーザーの画像メッセージを保存
    pub async fn append_image(&self, author: &User, url: ImageUrl) -> Result<Message, ChatError> {
        self.append(author, MessageBody::Image(url)).await
    }

    /// ユーザーに関するシステム通知を保存
    pub async fn append_notice(
        &self,
        subject: &User,
        notice: impl Into<String>,
    ) -> Result<Message, ChatError> {
        self.append(subject, MessageBody::Notice(notice.into()))
            .await
    }

    async fn append(&self, user: &User, body: MessageBody) -> Result<Message, ChatError> {
        let message = Message::new(
            IdFactory::message_id(),
            user.id,
            user.room_id,
            body,
            Timestamp::now(),
        );
        let saved = self.messages.save(message).await?;
        tracing::debug!("Saved message {} in room {}", saved.id, saved.room_id);
        Ok(saved)
    }

    pub async fn get(&self, message_id: &MessageId) -> Result<Message, ChatError> {
        Ok(self.messages.get_by_id(message_id).await?)
    }

    pub async fn remove(&self, message_id: &MessageId) -> Result<(), ChatError> {
        Ok(self.messages.remove_by_id(message_id).await?)
    }

    /// Room の履歴を日付の昇順で取得
    pub async fn history(&self, room_id: &RoomId) -> Result<Vec<Message>, ChatError> {
        Ok(self.messages.list_by_room_ordered(room_id).await?)
    }
}

/// Text of the notice posted when a user joins
pub fn joined_notice(user: &User) -> String {
    format!("User {} has joined the room", user.username)
}

/// Text of the notice posted when a user leaves
pub fn left_notice(user: &User) -> String {
    format!("User {} has left the room", user.username)
}
