//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Identifier is not a valid UUID
    #[error("{kind} must be a valid UUID format (got: {value})")]
    IdInvalidFormat { kind: &'static str, value: String },

    /// Username length out of bounds
    #[error("Username must be between {min} and {max} characters (got {actual})")]
    UsernameLength { min: usize, max: usize, actual: usize },

    /// Username contains characters outside the allowed set
    #[error("Username may only contain letters, digits, spaces, '_' and '-'")]
    UsernameCharset,

    /// Room name length out of bounds
    #[error("Room name must be between {min} and {max} characters (got {actual})")]
    RoomNameLength { min: usize, max: usize, actual: usize },

    /// Room name contains characters outside the allowed set
    #[error("Room name may only contain letters, digits, spaces, '_' and '-'")]
    RoomNameCharset,

    /// MessageText validation error
    #[error("Message text cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("Message text cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    /// Image or avatar URL is empty
    #[error("URL cannot be empty")]
    UrlEmpty,

    /// Image or avatar URL is too long
    #[error("URL cannot exceed {max} characters (got {actual})")]
    UrlTooLong { max: usize, actual: usize },

    /// Image or avatar URL has an unsupported scheme
    #[error("URL must start with http://, https:// or /")]
    UrlInvalidScheme,
}

impl ValueObjectError {
    /// Stable machine-readable code of the violated rule.
    pub fn code(&self) -> &'static str {
        match self {
            ValueObjectError::IdInvalidFormat { .. } => "invalid_format",
            ValueObjectError::UsernameLength { .. }
            | ValueObjectError::RoomNameLength { .. }
            | ValueObjectError::MessageTextTooLong { .. }
            | ValueObjectError::UrlTooLong { .. } => "length",
            ValueObjectError::UsernameCharset | ValueObjectError::RoomNameCharset => "charset",
            ValueObjectError::MessageTextEmpty | ValueObjectError::UrlEmpty => "required",
            ValueObjectError::UrlInvalidScheme => "scheme",
        }
    }
}

/// Errors returned by persistence ports
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// An active user with the same name already exists in the room
    #[error("Username '{username}' is already taken in room {room_id}")]
    DuplicateUsername { username: String, room_id: String },

    /// The connection is already bound to a user
    #[error("Connection {0} is already bound to a user")]
    ConnectionInUse(String),

    /// The backing store could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the blob store port
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("Upload is empty")]
    Empty,

    #[error("Upload exceeds {max} bytes (got {actual})")]
    TooLarge { max: usize, actual: usize },

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Blob storage I/O error: {0}")]
    Io(String),
}

/// Errors returned by the transport port
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection is not registered")]
    NotConnected,

    /// Outbound queue is full; the payload was dropped
    #[error("Outbound queue is full")]
    Stalled,

    #[error("Connection is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_object_error_codes() {
        // テスト項目: 検証エラーごとに安定したコードが返される
        // then (期待する結果):
        assert_eq!(
            ValueObjectError::UsernameLength {
                min: 3,
                max: 20,
                actual: 1
            }
            .code(),
            "length"
        );
        assert_eq!(ValueObjectError::RoomNameCharset.code(), "charset");
        assert_eq!(ValueObjectError::MessageTextEmpty.code(), "required");
        assert_eq!(ValueObjectError::UrlInvalidScheme.code(), "scheme");
    }
}
