//! In-process connection hub.
//!
//! Every live WebSocket registers a bounded outbound queue here. Room groups
//! are sets of connection ids; a group send enqueues one copy per member.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use crate::domain::{ConnectionId, IdFactory, RoomId, Timestamp, Transport, TransportError};

/// Client connection information
#[derive(Debug)]
pub struct ClientInfo {
    /// Outbound frame queue
    pub sender: mpsc::Sender<String>,
    /// Unix timestamp when connected (in JST, milliseconds)
    pub connected_at: Timestamp,
}

#[derive(Debug)]
pub struct ConnectionHub {
    queue_capacity: usize,
    connections: RwLock<HashMap<ConnectionId, ClientInfo>>,
    groups: RwLock<HashMap<RoomId, HashSet<ConnectionId>>>,
}

impl ConnectionHub {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            connections: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection and hand back the receiving end of its queue
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let connection_id = IdFactory::connection_id();
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        self.connections.write().await.insert(
            connection_id,
            ClientInfo {
                sender,
                connected_at: Timestamp::now(),
            },
        );
        tracing::debug!("Registered connection {connection_id}");
        (connection_id, receiver)
    }

    /// Forget a connection and drop it from every group
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut groups = self.groups.write().await;
        for members in groups.values_mut() {
            members.remove(connection_id);
        }
        groups.retain(|_, members| !members.is_empty());
        drop(groups);

        if let Some(info) = self.connections.write().await.remove(connection_id) {
            let lifetime = Timestamp::now().value() - info.connected_at.value();
            tracing::debug!("Unregistered connection {connection_id} after {lifetime}ms");
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn group_size(&self, room_id: &RoomId) -> usize {
        self.groups
            .read()
            .await
            .get(room_id)
            .map_or(0, HashSet::len)
    }

    fn enqueue(
        connection_id: &ConnectionId,
        info: &ClientInfo,
        payload: String,
    ) -> Result<(), TransportError> {
        info.sender.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Outbound queue of {connection_id} is full, dropping frame");
                TransportError::Stalled
            }
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

#[async_trait]
impl Transport for ConnectionHub {
    async fn send_to_connection(
        &self,
        connection_id: &ConnectionId,
        payload: String,
    ) -> Result<(), TransportError> {
        let connections = self.connections.read().await;
        let info = connections
            .get(connection_id)
            .ok_or(TransportError::NotConnected)?;
        Self::enqueue(connection_id, info, payload)
    }

    async fn send_to_group(&self, room_id: &RoomId, payload: String) -> usize {
        let groups = self.groups.read().await;
        let Some(members) = groups.get(room_id) else {
            return 0;
        };
        let connections = self.connections.read().await;

        members
            .iter()
            .filter_map(|id| connections.get(id).map(|info| (id, info)))
            .filter(|(id, info)| Self::enqueue(id, info, payload.clone()).is_ok())
            .count()
    }

    async fn add_to_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        // Same order as send_to_group: groups, then connections
        let mut groups = self.groups.write().await;
        if !self.connections.read().await.contains_key(connection_id) {
            tracing::debug!("Ignoring subscribe of unregistered connection {connection_id}");
            return;
        }
        groups.entry(*room_id).or_default().insert(*connection_id);
    }

    async fn remove_from_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut groups = self.groups.write().await;
        if let Some(members) = groups.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                groups.remove(room_id);
            }
        }
    }

    async fn remove_group(&self, room_id: &RoomId) {
        self.groups.write().await.remove(room_id);
    }
}
