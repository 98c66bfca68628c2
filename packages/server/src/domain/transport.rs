//! Transport port: per-connection unicast and room-scoped multicast.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{ConnectionId, RoomId, TransportError};

/// Delivers serialized frames to live connections.
///
/// Sends never block on a slow peer: a connection whose queue is full
/// loses the frame and the send reports `Stalled`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame to a single connection
    async fn send_to_connection(
        &self,
        connection_id: &ConnectionId,
        payload: String,
    ) -> Result<(), TransportError>;

    /// Send one frame to every member of a room's group; returns the number of deliveries
    async fn send_to_group(&self, room_id: &RoomId, payload: String) -> usize;

    async fn add_to_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    async fn remove_from_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// Discard a room's group entirely
    async fn remove_group(&self, room_id: &RoomId);
}
