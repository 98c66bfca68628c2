//! Coordinator テスト用のハーネス

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessageRepository, User},
    infrastructure::{
        dto::websocket::ServerMessage, repository::InMemoryChatStore, transport::ConnectionHub,
    },
    usecase::{
        dispatcher::BroadcastDispatcher, message_store::MessageStore,
        room_directory::RoomDirectory, session_registry::SessionRegistry,
    },
};

use super::{JoinRoomRequest, RoomCoordinator};

pub struct Harness {
    pub coordinator: RoomCoordinator,
    pub store: Arc<InMemoryChatStore>,
    pub hub: Arc<ConnectionHub>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryChatStore::new());
        Self::build(store.clone(), store)
    }

    /// メッセージの Repository だけを差し替える
    pub fn with_messages(messages: Arc<dyn MessageRepository>) -> Self {
        Self::build(Arc::new(InMemoryChatStore::new()), messages)
    }

    fn build(store: Arc<InMemoryChatStore>, messages: Arc<dyn MessageRepository>) -> Self {
        let hub = Arc::new(ConnectionHub::new(64));
        let coordinator = RoomCoordinator::new(
            RoomDirectory::new(store.clone(), store.clone()),
            SessionRegistry::new(store.clone()),
            MessageStore::new(messages),
            Arc::new(BroadcastDispatcher::new(hub.clone())),
        );
        Self {
            coordinator,
            store,
            hub,
        }
    }

    pub async fn connect(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        self.hub.register().await
    }

    /// 参加してそのユーザーを返す
    pub async fn join(&self, connection_id: ConnectionId, username: &str, room_name: &str) -> User {
        self.coordinator
            .join_room(join_request(connection_id, username, room_name))
            .await
            .unwrap()
    }

    /// キューに溜まっているフレームを全て取り出す
    pub fn frames(rx: &mut mpsc::Receiver<String>) -> Vec<ServerMessage> {
        let mut frames = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            frames.push(serde_json::from_str(&raw).unwrap());
        }
        frames
    }
}

pub fn join_request(connection_id: ConnectionId, username: &str, room_name: &str) -> JoinRoomRequest {
    JoinRoomRequest {
        connection_id,
        username: username.to_string(),
        room_name: room_name.to_string(),
        avatar: None,
    }
}
