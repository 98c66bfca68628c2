//! Room Coordinator
//!
//! 参加・送信・画像送信・削除・切断の各フローを実行します。
//!
//! - 入力の検証
//! - Session Registry / Room Directory の更新
//! - Message Store への永続化
//! - Broadcast Dispatcher への配信命令
//!
//! 同じ Room に対する変更は Room ロックの中で行い、配信もロックの中で実行します。
//! これにより Room 内のイベントは永続化と同じ順序で各接続のキューに積まれます。

mod disconnect;
mod join_room;
mod query;
mod remove_message;
mod send_message;

#[cfg(test)]
mod test_support;

use std::{collections::HashMap, sync::Arc};

use crate::domain::{ConnectionId, Message, Room, User, UserId};

use super::{
    dispatcher::BroadcastDispatcher,
    error::{ChatError, NotFoundKind},
    message_store::MessageStore,
    outbound::{Author, MessageView},
    room_directory::{RoomDirectory, RoomGuard},
    session_registry::SessionRegistry,
};

pub use disconnect::DisconnectOutcome;
pub use join_room::JoinRoomRequest;
pub use query::RoomSnapshot;
pub use send_message::SenderRef;

/// Room Coordinator
pub struct RoomCoordinator {
    directory: RoomDirectory,
    sessions: SessionRegistry,
    messages: MessageStore,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl RoomCoordinator {
    /// 新しい RoomCoordinator を作成
    pub fn new(
        directory: RoomDirectory,
        sessions: SessionRegistry,
        messages: MessageStore,
        dispatcher: Arc<BroadcastDispatcher>,
    ) -> Self {
        Self {
            directory,
            sessions,
            messages,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Arc<BroadcastDispatcher> {
        &self.dispatcher
    }

    /// 接続の有効なセッションを解決し、その Room のロックを取得する
    ///
    /// ロック取得までの間に Room が後片付けされた場合もあるため、ロックの中で再解決します。
    async fn lock_live_session(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<(RoomGuard, Room, User), ChatError> {
        let user = self.sessions.require_live_session(connection_id).await?;
        let room = self.room_of(&user).await?;
        let guard = self.directory.lock(&room.name).await;
        let user = self.sessions.require_live_session(connection_id).await?;
        if user.room_id != room.id {
            return Err(ChatError::NotFound(NotFoundKind::UserNotFound));
        }
        Ok((guard, room, user))
    }

    /// ユーザーの Room を取得（Room がなければユーザーもいない）
    async fn room_of(&self, user: &User) -> Result<Room, ChatError> {
        match self.directory.get(&user.room_id).await {
            Err(ChatError::NotFound(NotFoundKind::RoomNotFound)) => {
                Err(ChatError::NotFound(NotFoundKind::UserNotFound))
            }
            other => other,
        }
    }

    /// メッセージに作者の表示情報を付与する
    ///
    /// 作者のレコードが残っていなければ `author` は `None`。
    async fn message_views(&self, messages: Vec<Message>) -> Result<Vec<MessageView>, ChatError> {
        let mut authors: HashMap<UserId, Option<Author>> = HashMap::new();
        let mut views = Vec::with_capacity(messages.len());

        for message in messages {
            let author = match authors.get(&message.user_id) {
                Some(author) => author.clone(),
                None => {
                    let author = match self.sessions.get_by_id(&message.user_id).await {
                        Ok(user) => Some(Author::from(&user)),
                        Err(ChatError::NotFound(NotFoundKind::UserNotFound)) => None,
                        Err(e) => return Err(e),
                    };
                    authors.insert(message.user_id, author.clone());
                    author
                }
            };
            views.push(MessageView { message, author });
        }

        Ok(views)
    }
}
