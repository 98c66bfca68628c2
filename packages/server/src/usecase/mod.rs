//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の Repository / Transport を操作します。

pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod message_store;
pub mod outbound;
pub mod room_directory;
pub mod session_registry;

pub use coordinator::{DisconnectOutcome, JoinRoomRequest, RoomCoordinator, RoomSnapshot, SenderRef};
pub use dispatcher::BroadcastDispatcher;
pub use error::{ChatError, ConflictKind, FailureKind, FieldViolation, NotFoundKind};
pub use message_store::MessageStore;
pub use outbound::{Author, ChatEvent, MessageView, Outbound, Scope};
pub use room_directory::{RoomDirectory, RoomGuard, RoomLocks};
pub use session_registry::SessionRegistry;
