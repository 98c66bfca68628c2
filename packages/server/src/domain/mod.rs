//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod blob;
pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use blob::{BlobStore, UploadKind};
pub use entity::{Message, MessageBody, Room, User};
pub use error::{BlobError, RepositoryError, TransportError, ValueObjectError};
pub use factory::IdFactory;
pub use repository::{DrainReport, MessageRepository, RoomRepository, RoomTeardown, UserRepository};
pub use transport::Transport;
pub use value_object::{
    ConnectionId, ImageUrl, MessageId, MessageText, RoomId, RoomName, Timestamp, UserId, Username,
};
