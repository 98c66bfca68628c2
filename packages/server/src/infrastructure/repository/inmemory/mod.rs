//! InMemory ストア実装
//!
//! ドメイン層が定義する各 Repository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! Room・User・Message の 3 テーブルを 1 つの `RwLock` で保護しているため、
//! `RoomTeardown::drain` は 1 回の書き込みロックで完結し、途中状態は観測されません。
//! 読み取り（一覧取得や存在確認）は並行に実行できます。

mod message;
mod room;
mod user;

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{ConnectionId, Message, MessageId, Room, RoomId, RoomName, User, UserId};

/// インメモリのテーブル群
#[derive(Debug, Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    room_ids_by_name: HashMap<RoomName, RoomId>,
    users: HashMap<UserId, User>,
    user_ids_by_connection: HashMap<ConnectionId, UserId>,
    /// Room ごとの保存順のメッセージ
    messages: HashMap<RoomId, Vec<Message>>,
    message_rooms: HashMap<MessageId, RoomId>,
}

/// インメモリ Chat ストア実装
///
/// `RoomRepository`・`UserRepository`・`MessageRepository`・`RoomTeardown` を実装します。
/// UseCase 層には trait object として個別に注入されます。
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    tables: RwLock<Tables>,
}

impl InMemoryChatStore {
    /// 新しい空の InMemoryChatStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}
