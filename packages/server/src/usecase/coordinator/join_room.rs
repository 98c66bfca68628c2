//! UseCase: Room への参加
//!
//! 検証と重複チェックは全ての書き込みより前に行います。
//! ユーザーの書き込み後に失敗した場合は、ユーザーを削除し、
//! Room が空になっていれば後片付けします。配信は全ての書き込みが成功してから行うため、
//! 失敗時に取り消す配信はありません。

use crate::domain::{
    ConnectionId, IdFactory, ImageUrl, Room, RoomName, Timestamp, User, Username,
};

use super::{
    super::{
        error::{ChatError, ConflictKind, FieldViolation},
        message_store::joined_notice,
        outbound::{Author, ChatEvent, MessageView, Outbound},
    },
    RoomCoordinator,
};

/// Room 参加リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoomRequest {
    pub connection_id: ConnectionId,
    pub username: String,
    pub room_name: String,
    pub avatar: Option<String>,
}

struct ValidJoin {
    username: Username,
    room_name: RoomName,
    avatar: Option<ImageUrl>,
}

/// 全てのフィールドを検証し、違反をまとめて返す
fn validate(request: &JoinRoomRequest) -> Result<ValidJoin, ChatError> {
    let mut violations = Vec::new();

    let username = Username::new(request.username.clone())
        .map_err(|e| violations.push(FieldViolation::from_value_error("username", &e)))
        .ok();
    let room_name = RoomName::new(request.room_name.clone())
        .map_err(|e| violations.push(FieldViolation::from_value_error("room_name", &e)))
        .ok();
    let avatar = match request.avatar.as_deref().map(str::trim) {
        None | Some("") => Some(None),
        Some(url) => ImageUrl::new(url.to_string())
            .map(Some)
            .map_err(|e| violations.push(FieldViolation::from_value_error("avatar", &e)))
            .ok(),
    };

    match (username, room_name, avatar) {
        (Some(username), Some(room_name), Some(avatar)) if violations.is_empty() => Ok(ValidJoin {
            username,
            room_name,
            avatar,
        }),
        _ => Err(ChatError::Validation(violations)),
    }
}

impl RoomCoordinator {
    /// Room に参加する
    ///
    /// 成功時の配信順:
    /// 1. 接続を Room のグループに追加
    /// 2. 本人に `joined`
    /// 3. Room に参加者一覧
    /// 4. Room に参加通知
    /// 5. 本人に履歴（参加通知を保存する前のスナップショット）
    pub async fn join_room(&self, request: JoinRoomRequest) -> Result<User, ChatError> {
        let valid = validate(&request)?;

        if self
            .sessions
            .find_live_session(&request.connection_id)
            .await?
            .is_some()
        {
            return Err(ChatError::Conflict(ConflictKind::AlreadyJoined));
        }

        let _guard = self.directory.lock(&valid.room_name).await;
        let room = self.directory.get_or_create(&valid.room_name).await?;

        let user = User::new(
            IdFactory::user_id(),
            valid.username,
            request.connection_id,
            room.id,
            valid.avatar,
            Timestamp::now(),
        );
        let user = match self.sessions.add(user).await {
            Ok(user) => user,
            Err(e) => {
                self.rollback_join(&room, None).await;
                return Err(e);
            }
        };

        match self.complete_join(&room, &user).await {
            Ok(outbound) => {
                self.dispatcher.dispatch(outbound).await;
                tracing::info!(
                    "User '{}' ({}) joined room '{}'",
                    user.username,
                    user.id,
                    room.name
                );
                Ok(user)
            }
            Err(e) => {
                self.rollback_join(&room, Some(&user)).await;
                Err(e)
            }
        }
    }

    /// 参加に伴う読み取りと通知の保存を行い、配信命令を組み立てる
    async fn complete_join(&self, room: &Room, user: &User) -> Result<Vec<Outbound>, ChatError> {
        let roster = self.sessions.list_active(&room.id).await?;
        let history = self.messages.history(&room.id).await?;
        let history = self.message_views(history).await?;
        let notice = self.messages.append_notice(user, joined_notice(user)).await?;

        Ok(vec![
            Outbound::Subscribe {
                room_id: room.id,
                connection_id: user.connection_id,
            },
            Outbound::to_connection(user.connection_id, ChatEvent::Joined { user: user.clone() }),
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
                    author: Some(Author::from(user)),
                }),
            ),
            Outbound::to_connection(
                user.connection_id,
                ChatEvent::MessageHistory {
                    room_id: room.id,
                    messages: history,
                },
            ),
        ])
    }

    /// 途中で失敗した参加を取り消す
    async fn rollback_join(&self, room: &Room, user: Option<&User>) {
        if let Some(user) = user
            && let Err(e) = self.sessions.remove(&user.id).await
        {
            tracing::error!("Failed to roll back user {}: {e}", user.id);
        }

        match self.sessions.list_active(&room.id).await {
            Ok(users) if users.is_empty() => {
                if let Err(e) = self.directory.drain(room).await {
                    tracing::error!("Failed to discard empty room {}: {e}", room.id);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Failed to inspect room {} after rollback: {e}", room.id),
        }
    }
}
