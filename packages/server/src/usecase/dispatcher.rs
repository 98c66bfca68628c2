//! Broadcast Dispatcher
//!
//! Room Coordinator の出力（`Outbound`）を Transport の
//! グループ配信・個別配信に変換します。状態は持たず、再送もしません。

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, Transport},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{
    error::ChatError,
    outbound::{Outbound, Scope},
};

pub struct BroadcastDispatcher {
    transport: Arc<dyn Transport>,
}

impl BroadcastDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 命令を順番に実行する
    pub async fn dispatch(&self, outbound: Vec<Outbound>) {
        for item in outbound {
            self.dispatch_one(item).await;
        }
    }

    async fn dispatch_one(&self, item: Outbound) {
        match item {
            Outbound::Subscribe {
                room_id,
                connection_id,
            } => self.transport.add_to_group(&room_id, &connection_id).await,
            Outbound::Unsubscribe {
                room_id,
                connection_id,
            } => {
                self.transport
                    .remove_from_group(&room_id, &connection_id)
                    .await
            }
            Outbound::CloseGroup { room_id } => self.transport.remove_group(&room_id).await,
            Outbound::Notify { scope, event } => {
                let Some(payload) = encode(&ServerMessage::from(&event)) else {
                    return;
                };
                match scope {
                    Scope::Room(room_id) => {
                        let delivered = self.transport.send_to_group(&room_id, payload).await;
                        tracing::debug!("Broadcast to room {room_id}: {delivered} deliveries");
                    }
                    Scope::Connection(connection_id) => {
                        self.unicast(&connection_id, payload).await;
                    }
                }
            }
        }
    }

    /// エラーを発生元の接続にだけ通知する
    pub async fn dispatch_error(&self, connection_id: &ConnectionId, error: &ChatError) {
        tracing::warn!(
            "Rejected request from {connection_id}: {} ({error})",
            error.code()
        );
        if let Some(payload) = encode(&ServerMessage::from(error)) {
            self.unicast(connection_id, payload).await;
        }
    }

    async fn unicast(&self, connection_id: &ConnectionId, payload: String) {
        if let Err(e) = self.transport.send_to_connection(connection_id, payload).await {
            tracing::warn!("Failed to deliver to {connection_id}: {e}");
        }
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {e}");
            None
        }
    }
}
