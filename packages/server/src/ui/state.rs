//! Server state and wiring.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::BlobStore,
    infrastructure::{
        blob::LocalBlobStore, repository::InMemoryChatStore, transport::ConnectionHub,
    },
    usecase::{
        BroadcastDispatcher, MessageStore, RoomCoordinator, RoomDirectory, SessionRegistry,
    },
};

/// Shared application state
pub struct AppState {
    pub coordinator: RoomCoordinator,
    /// Live connections and room groups
    pub hub: Arc<ConnectionHub>,
    pub blob_store: Arc<dyn BlobStore>,
    pub config: ServerConfig,
}

impl AppState {
    /// Wire the in-memory store, the connection hub and the local blob store together
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(InMemoryChatStore::new());
        let hub = Arc::new(ConnectionHub::new(config.outbound_queue_capacity));
        let blob_store = Arc::new(LocalBlobStore::new(
            config.upload_dir.clone(),
            &config.public_upload_base,
            config.max_upload_bytes,
        ));

        let coordinator = RoomCoordinator::new(
            RoomDirectory::new(store.clone(), store.clone()),
            SessionRegistry::new(store.clone()),
            MessageStore::new(store),
            Arc::new(BroadcastDispatcher::new(hub.clone())),
        );

        Self {
            coordinator,
            hub,
            blob_store,
            config,
        }
    }
}
